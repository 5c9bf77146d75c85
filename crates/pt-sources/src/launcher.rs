//! Adapter for the PC game-launcher library export.
//!
//! The launcher exports its whole library as CSV with a one-line metadata
//! preamble ahead of the header row. Playtime is a cumulative seconds
//! counter, and rows carry the launcher's own stable game id, so this source
//! never goes through fuzzy matching.
//!
//! Rows are dropped when they would double-count a console title, when the
//! entry is an app rather than a game, or when the entry is hidden.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use pt_core::Snapshot;

use crate::discover::{self, SelectionPolicy};
use crate::parse::{self, FileParseError, SourceError, parse_extract_date};

/// File extension of launcher extracts.
const EXTENSION: &str = "csv";

/// One row of the launcher's library export.
#[derive(Debug, Deserialize)]
struct LauncherRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Platforms")]
    platforms: String,
    #[serde(rename = "Categories", default)]
    categories: String,
    #[serde(rename = "Hidden", default)]
    hidden: String,
    #[serde(rename = "Playtime")]
    playtime_secs: i64,
    #[serde(rename = "ExportDate")]
    export_date: String,
}

impl LauncherRow {
    fn is_hidden(&self) -> bool {
        self.hidden.eq_ignore_ascii_case("true")
    }

    fn is_app(&self) -> bool {
        self.categories.to_lowercase().contains("apps")
    }
}

/// Loads and normalizes every launcher extract under `root`.
///
/// `excluded_platforms` lists the console platform tags whose titles the
/// console source already covers.
pub fn load(
    root: &Path,
    policy: SelectionPolicy,
    excluded_platforms: &[String],
) -> Result<Vec<Snapshot>, SourceError> {
    let files = discover::discover(root, EXTENSION, policy)?;
    parse::parse_selected(root, &files, |path| parse_file(path, excluded_platforms))
}

fn parse_file(path: &Path, excluded_platforms: &[String]) -> Result<Vec<Snapshot>, FileParseError> {
    let contents = fs::read_to_string(path)?;

    // The export format puts one metadata line ahead of the header row.
    let body = contents
        .split_once('\n')
        .map_or("", |(_, rest)| rest);
    if body.is_empty() {
        return Err(FileParseError::new("missing header row after preamble"));
    }

    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let mut snapshots = Vec::new();
    for row in reader.deserialize() {
        let row: LauncherRow = row?;

        if excluded_platforms.contains(&row.platforms) || row.is_app() || row.is_hidden() {
            continue;
        }

        let observed_at = parse_extract_date(&row.export_date)?;
        snapshots.push(Snapshot {
            name: row.name,
            platform: row.platforms,
            id: Some(row.id),
            // Seconds counter, rounded to the nearest minute.
            total_minutes: (row.playtime_secs + 30) / 60,
            observed_at,
        });
    }
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;

    const HEADER: &str = "Name,Id,Platforms,Categories,Hidden,Playtime,ExportDate";

    fn write_extract(dir: &Path, folder: &str, rows: &[&str]) {
        let folder = dir.join(folder);
        fs::create_dir_all(&folder).unwrap();
        let contents = format!(
            "Library export v2\n{HEADER}\n{}\n",
            rows.join("\n")
        );
        fs::write(folder.join("library.csv"), contents).unwrap();
    }

    fn excluded() -> Vec<String> {
        vec!["Switch".to_string()]
    }

    #[test]
    fn preamble_is_skipped_and_rows_parsed() {
        let temp = TempDir::new().unwrap();
        write_extract(
            temp.path(),
            "2025-06-01",
            &["Hades,g1,PC,,False,6000,2025-06-01 08:00:00"],
        );

        let snaps = load(temp.path(), SelectionPolicy::SecondCreated, &excluded()).unwrap();
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].name, "Hades");
        assert_eq!(snaps[0].id.as_deref(), Some("g1"));
        assert_eq!(snaps[0].total_minutes, 100);
        assert_eq!(
            snaps[0].observed_at,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
    }

    #[test]
    fn console_app_and_hidden_rows_are_dropped() {
        let temp = TempDir::new().unwrap();
        write_extract(
            temp.path(),
            "2025-06-01",
            &[
                "Hades,g1,PC,,False,6000,2025-06-01 08:00:00",
                "Zelda,g2,Switch,,False,6000,2025-06-01 08:00:00",
                "Browser,g3,PC,Web Apps,False,6000,2025-06-01 08:00:00",
                "Secret,g4,PC,,True,6000,2025-06-01 08:00:00",
            ],
        );

        let snaps = load(temp.path(), SelectionPolicy::SecondCreated, &excluded()).unwrap();
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].name, "Hades");
    }

    #[test]
    fn playtime_seconds_round_to_minutes() {
        let temp = TempDir::new().unwrap();
        write_extract(
            temp.path(),
            "2025-06-01",
            &["Hades,g1,PC,,False,100,2025-06-01 08:00:00"],
        );

        let snaps = load(temp.path(), SelectionPolicy::SecondCreated, &excluded()).unwrap();
        assert_eq!(snaps[0].total_minutes, 2);
    }

    #[test]
    fn malformed_file_is_skipped_when_others_parse() {
        let temp = TempDir::new().unwrap();
        write_extract(
            temp.path(),
            "2025-06-01",
            &["Hades,g1,PC,,False,6000,2025-06-01 08:00:00"],
        );
        let bad = temp.path().join("2025-06-02");
        fs::create_dir_all(&bad).unwrap();
        fs::write(bad.join("library.csv"), "not a csv at all").unwrap();

        let snaps = load(temp.path(), SelectionPolicy::SecondCreated, &excluded()).unwrap();
        assert_eq!(snaps.len(), 1);
    }

    #[test]
    fn all_files_malformed_is_fatal() {
        let temp = TempDir::new().unwrap();
        let bad = temp.path().join("2025-06-01");
        fs::create_dir_all(&bad).unwrap();
        fs::write(bad.join("library.csv"), "junk").unwrap();

        let err = load(temp.path(), SelectionPolicy::SecondCreated, &excluded()).unwrap_err();
        assert!(matches!(err, SourceError::NoUsableFiles { .. }));
    }

    #[test]
    fn empty_root_is_no_data_found() {
        let temp = TempDir::new().unwrap();
        let err = load(temp.path(), SelectionPolicy::SecondCreated, &excluded()).unwrap_err();
        assert!(matches!(err, SourceError::Discover(_)));
    }
}

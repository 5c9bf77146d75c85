//! Adapter for the scraped console-profile export.
//!
//! An upstream scraper turns the profile page into a headered CSV per
//! capture day. Playtime arrives in the shorthand grammar (`"11h 45m"`) and
//! titles are the profile's own spelling, so this source goes through fuzzy
//! matching downstream.

use std::path::Path;

use serde::Deserialize;

use pt_core::{Snapshot, duration};

use crate::discover::{self, SelectionPolicy};
use crate::parse::{self, FileParseError, SourceError, parse_extract_date};

const EXTENSION: &str = "csv";

/// One row of the scraped profile export.
#[derive(Debug, Deserialize)]
struct ConsoleRow {
    game_name: String,
    time_played: String,
    platform: String,
    extract_date: String,
}

/// Loads and normalizes every console extract under `root`.
pub fn load(root: &Path, policy: SelectionPolicy) -> Result<Vec<Snapshot>, SourceError> {
    let files = discover::discover(root, EXTENSION, policy)?;
    parse::parse_selected(root, &files, parse_file)
}

fn parse_file(path: &Path) -> Result<Vec<Snapshot>, FileParseError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut snapshots = Vec::new();
    for row in reader.deserialize() {
        let row: ConsoleRow = row?;
        let observed_at = parse_extract_date(&row.extract_date)?;
        snapshots.push(Snapshot {
            name: row.game_name,
            platform: row.platform,
            id: None,
            total_minutes: duration::shorthand_to_minutes(&row.time_played),
            observed_at,
        });
    }
    Ok(snapshots)
}

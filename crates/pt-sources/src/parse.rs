//! Shared per-file parsing machinery for the snapshot adapters.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use thiserror::Error;

use pt_core::Snapshot;

use crate::discover::DiscoverError;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Discover(#[from] DiscoverError),

    /// Every discovered file failed to parse. Individual failures are
    /// warnings; losing the whole source is not.
    #[error("no usable extract files under {} ({failed} failed to parse)", .root.display())]
    NoUsableFiles { root: PathBuf, failed: usize },
}

/// A single file that could not be parsed. Skipped and logged, never fatal
/// on its own.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct FileParseError {
    pub reason: String,
}

impl FileParseError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for FileParseError {
    fn from(err: csv::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<std::io::Error> for FileParseError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Parses every selected file, skipping and logging failures.
///
/// Parsing is fanned out with rayon; each file is independent, so this
/// changes throughput and nothing else. Fatal only when no file at all
/// parses.
pub(crate) fn parse_selected<F>(
    root: &Path,
    files: &[PathBuf],
    parse: F,
) -> Result<Vec<Snapshot>, SourceError>
where
    F: Fn(&Path) -> Result<Vec<Snapshot>, FileParseError> + Sync,
{
    let results: Vec<(PathBuf, Result<Vec<Snapshot>, FileParseError>)> = files
        .par_iter()
        .map(|path| (path.clone(), parse(path)))
        .collect();

    let mut snapshots = Vec::new();
    let mut failed = 0usize;
    for (path, result) in results {
        match result {
            Ok(mut parsed) => {
                tracing::debug!(file = %path.display(), rows = parsed.len(), "parsed extract");
                snapshots.append(&mut parsed);
            }
            Err(err) => {
                failed += 1;
                tracing::warn!(file = %path.display(), reason = %err, "skipping unparseable extract");
            }
        }
    }

    if snapshots.is_empty() && failed > 0 {
        return Err(SourceError::NoUsableFiles {
            root: root.to_path_buf(),
            failed,
        });
    }

    Ok(snapshots)
}

/// Parses a capture timestamp in any of the formats the exports use,
/// keeping the date part.
pub(crate) fn parse_extract_date(value: &str) -> Result<NaiveDate, FileParseError> {
    let value = value.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(dt.date());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| FileParseError::new(format!("unrecognized extract date '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_date_accepts_datetime_and_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(parse_extract_date("2025-06-01 08:30:00").unwrap(), expected);
        assert_eq!(parse_extract_date("2025-06-01T08:30:00").unwrap(), expected);
        assert_eq!(parse_extract_date("2025-06-01").unwrap(), expected);
    }

    #[test]
    fn extract_date_rejects_garbage() {
        assert!(parse_extract_date("June 1st").is_err());
        assert!(parse_extract_date("").is_err());
    }
}

//! Daily-playtime CSV output (and re-reading for the combine stage).

use std::path::{Path, PathBuf};

use thiserror::Error;

use pt_core::DailyPlaytime;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: csv::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: csv::Error,
    },
}

/// Writes daily records as CSV, creating the parent directory if needed.
///
/// Columns: `date, name, id, playtime_mins, platform, gap_flag`.
pub fn write_records(path: &Path, records: &[DailyPlaytime]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    for record in records {
        writer.serialize(record).map_err(|source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    writer.flush().map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source: csv::Error::from(source),
    })?;

    tracing::info!(records = records.len(), path = %path.display(), "wrote daily playtime");
    Ok(())
}

/// Reads a daily-playtime CSV written by [`write_records`].
pub fn read_records(path: &Path) -> Result<Vec<DailyPlaytime>, OutputError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| OutputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    reader
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| OutputError::Read {
            path: path.to_path_buf(),
            source,
        })
}

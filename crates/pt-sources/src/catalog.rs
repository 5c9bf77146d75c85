//! Canonical catalog loading.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use pt_core::{Catalog, CatalogEntry};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read catalog {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: csv::Error,
    },
}

/// One row of the catalog export: `id, name, platforms`, with platforms as a
/// `;`-separated list.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    name: String,
    platforms: String,
}

/// Loads the canonical catalog. A missing file is a configuration problem,
/// not a per-file warning.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    if !path.is_file() {
        return Err(CatalogError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut entries = Vec::new();
    for row in reader.deserialize() {
        let row: CatalogRow = row.map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        entries.push(CatalogEntry {
            id: row.id,
            name: row.name,
            platforms: row
                .platforms
                .split(';')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(ToString::to_string)
                .collect(),
        });
    }

    tracing::debug!(entries = entries.len(), path = %path.display(), "loaded catalog");
    Ok(Catalog::new(entries))
}

//! Extract discovery and duplicate-file selection.
//!
//! Each capture period lands in its own folder under a source's raw
//! directory. A re-run of a capture leaves two files in one folder; which
//! duplicate is authoritative depends on the source (an initial export vs. a
//! corrected re-export), so the selection policy is per-source configuration.
//!
//! Ordering among duplicates uses the filesystem creation timestamp, falling
//! back to the modified timestamp where the filesystem has no birth times,
//! with the file name as a final tie-break so selection stays deterministic.
//! The exports carry no capture-sequence field that would make this robust
//! against timestamp-mangling transfer tools; see DESIGN notes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoverError {
    /// The root directory yields no matching files at all.
    #[error("no *.{extension} files found under {}", .root.display())]
    NoDataFound { root: PathBuf, extension: String },

    /// The root path could not be turned into a search pattern.
    #[error("invalid search root: {}", .root.display())]
    InvalidRoot { root: PathBuf },

    #[error("failed to search {}: {source}", .root.display())]
    Glob {
        root: PathBuf,
        source: glob::PatternError,
    },
}

/// Which duplicate extract is authoritative within one capture folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Expect a single file per folder; duplicates fall back to the earliest.
    #[default]
    Only,
    /// The earliest-created file among duplicates.
    FirstCreated,
    /// The second-earliest-created file (a re-export supersedes the initial
    /// export).
    SecondCreated,
}

/// Creation timestamp with a modified-time fallback.
fn created_at(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .map(|meta| meta.created().or_else(|_| meta.modified()).unwrap_or(SystemTime::UNIX_EPOCH))
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Recursively discovers extract files under `root` and selects one per
/// capture folder according to `policy`.
///
/// Returned paths are ordered by folder for deterministic downstream
/// processing. Zero matching files under the whole root is fatal
/// ([`DiscoverError::NoDataFound`]).
pub fn discover(
    root: &Path,
    extension: &str,
    policy: SelectionPolicy,
) -> Result<Vec<PathBuf>, DiscoverError> {
    let root_str = root.to_str().ok_or_else(|| DiscoverError::InvalidRoot {
        root: root.to_path_buf(),
    })?;
    let pattern = format!("{root_str}/**/*.{extension}");
    let entries = glob::glob(&pattern).map_err(|source| DiscoverError::Glob {
        root: root.to_path_buf(),
        source,
    })?;

    // Group by immediate parent folder: one folder is one capture period.
    let mut by_folder: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for entry in entries {
        let Ok(path) = entry else { continue };
        if !path.is_file() {
            continue;
        }
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        by_folder.entry(parent).or_default().push(path);
    }

    warn_empty_leaf_folders(root, extension);

    if by_folder.is_empty() {
        return Err(DiscoverError::NoDataFound {
            root: root.to_path_buf(),
            extension: extension.to_string(),
        });
    }

    let mut selected = Vec::with_capacity(by_folder.len());
    for (folder, mut files) in by_folder {
        files.sort_by_key(|path| (created_at(path), path.file_name().map(ToOwned::to_owned)));

        let choice = match policy {
            SelectionPolicy::Only => {
                if files.len() > 1 {
                    tracing::warn!(
                        folder = %folder.display(),
                        count = files.len(),
                        "expected a single extract file; using the earliest"
                    );
                }
                files.swap_remove(0)
            }
            SelectionPolicy::FirstCreated => files.swap_remove(0),
            SelectionPolicy::SecondCreated => {
                if files.len() >= 2 {
                    files.swap_remove(1)
                } else {
                    files.swap_remove(0)
                }
            }
        };
        tracing::debug!(folder = %folder.display(), file = %choice.display(), "selected extract");
        selected.push(choice);
    }

    tracing::info!(
        files = selected.len(),
        root = %root.display(),
        "selected one extract per capture folder"
    );
    Ok(selected)
}

/// Warns about leaf folders that contain no matching files, so an operator
/// can spot a capture that produced an empty directory.
fn warn_empty_leaf_folders(root: &Path, extension: &str) {
    let Ok(entries) = std::fs::read_dir(root) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let has_match = std::fs::read_dir(&path)
                .map(|mut children| {
                    children.any(|c| {
                        c.as_ref().is_ok_and(|c| {
                            let path = c.path();
                            path.is_dir()
                                || path.extension().and_then(|e| e.to_str()) == Some(extension)
                        })
                    })
                })
                .unwrap_or(false);
            if has_match {
                warn_empty_leaf_folders(&path, extension);
            } else {
                tracing::warn!(folder = %path.display(), "capture folder has no extract files; skipping");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn touch(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn one_file_per_folder_is_selected() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("2025-01-01/extract.csv"), "a");
        touch(&temp.path().join("2025-01-02/extract.csv"), "b");

        let files = discover(temp.path(), "csv", SelectionPolicy::Only).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn empty_root_is_no_data_found() {
        let temp = TempDir::new().unwrap();
        let err = discover(temp.path(), "csv", SelectionPolicy::Only).unwrap_err();
        assert!(matches!(err, DiscoverError::NoDataFound { .. }));
    }

    #[test]
    fn non_matching_extension_is_ignored() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("2025-01-01/notes.txt"), "a");
        let err = discover(temp.path(), "csv", SelectionPolicy::Only).unwrap_err();
        assert!(matches!(err, DiscoverError::NoDataFound { .. }));
    }

    #[test]
    fn second_created_picks_the_re_export() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("2025-01-01/extract_a.csv");
        let second = temp.path().join("2025-01-01/extract_b.csv");
        touch(&first, "initial");
        // Ensure a strictly later timestamp on filesystems with coarse clocks.
        std::thread::sleep(std::time::Duration::from_millis(20));
        touch(&second, "re-export");

        let files = discover(temp.path(), "csv", SelectionPolicy::SecondCreated).unwrap();
        assert_eq!(files, vec![second]);
    }

    #[test]
    fn second_created_falls_back_to_the_only_file() {
        let temp = TempDir::new().unwrap();
        let only = temp.path().join("2025-01-01/extract.csv");
        touch(&only, "a");

        let files = discover(temp.path(), "csv", SelectionPolicy::SecondCreated).unwrap();
        assert_eq!(files, vec![only]);
    }

    #[test]
    fn first_created_picks_the_initial_export() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("2025-01-01/extract_a.csv");
        let second = temp.path().join("2025-01-01/extract_b.csv");
        touch(&first, "initial");
        std::thread::sleep(std::time::Duration::from_millis(20));
        touch(&second, "re-export");

        let files = discover(temp.path(), "csv", SelectionPolicy::FirstCreated).unwrap();
        assert_eq!(files, vec![first]);
    }

    #[test]
    fn selection_policy_deserializes_kebab_case() {
        let policy: SelectionPolicy = serde_plain_from_str("second-created");
        assert_eq!(policy, SelectionPolicy::SecondCreated);
    }

    fn serde_plain_from_str(s: &str) -> SelectionPolicy {
        // Round-trip through a single-column CSV to avoid a serde_json
        // dev-dependency.
        let data = format!("policy\n{s}\n");
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        #[derive(Deserialize)]
        struct Row {
            policy: SelectionPolicy,
        }
        let row: Row = reader.deserialize().next().unwrap().unwrap();
        row.policy
    }
}

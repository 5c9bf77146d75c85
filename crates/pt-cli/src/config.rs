//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pt_sources::SelectionPolicy;

/// Configuration problems are fatal before any pipeline work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("source directory does not exist: {}", .path.display())]
    MissingDirectory { path: PathBuf },
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub launcher: LauncherSection,
    pub console: ConsoleSection,
    pub emulator: EmulatorSection,
    pub catalog: CatalogSection,
    pub output: OutputSection,
}

/// The PC launcher's library-export source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherSection {
    /// Root of the per-day raw extract folders.
    pub raw_dir: PathBuf,
    /// Which duplicate extract wins within a capture folder. The launcher's
    /// corrected re-export supersedes the initial one.
    pub selection: SelectionPolicy,
}

/// The scraped console-profile source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleSection {
    pub raw_dir: PathBuf,
    pub selection: SelectionPolicy,
    /// Catalog platform tags this source covers; also excluded from the
    /// launcher source to avoid double-counting.
    pub platforms: Vec<String>,
}

/// The emulator session-log source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmulatorSection {
    pub raw_dir: PathBuf,
    /// Catalog platform tag for emulated titles.
    pub platform: String,
    /// Sessions at or under this runtime are accidental launches.
    pub min_session_secs: i64,
}

/// The canonical catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSection {
    pub path: PathBuf,
    /// Minimum fuzzy-match score (0-100) to accept a title.
    pub match_threshold: u8,
}

/// Where processed outputs land.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            launcher: LauncherSection {
                raw_dir: data_dir.join("launcher/raw"),
                selection: SelectionPolicy::SecondCreated,
            },
            console: ConsoleSection {
                raw_dir: data_dir.join("console/raw"),
                selection: SelectionPolicy::FirstCreated,
                platforms: vec![
                    "Nintendo Switch".to_string(),
                    "Nintendo Switch 2".to_string(),
                ],
            },
            emulator: EmulatorSection {
                raw_dir: data_dir.join("emulator/raw"),
                platform: "Emulator".to_string(),
                min_session_secs: 30,
            },
            catalog: CatalogSection {
                path: data_dir.join("catalog/library.csv"),
                match_threshold: pt_core::DEFAULT_MATCH_THRESHOLD,
            },
            output: OutputSection {
                dir: data_dir.join("processed"),
            },
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (PT_*, double underscore nesting)
        figment = figment.merge(Env::prefixed("PT_").split("__"));

        figment.extract()
    }

    /// Per-source daily playtime output file.
    #[must_use]
    pub fn launcher_daily_file(&self) -> PathBuf {
        self.output.dir.join("launcher_daily_playtimes.csv")
    }

    #[must_use]
    pub fn console_daily_file(&self) -> PathBuf {
        self.output.dir.join("console_daily_playtimes.csv")
    }

    #[must_use]
    pub fn emulator_daily_file(&self) -> PathBuf {
        self.output.dir.join("emulator_daily_playtimes.csv")
    }

    /// The combined cross-source timeline.
    #[must_use]
    pub fn combined_daily_file(&self) -> PathBuf {
        self.output.dir.join("daily_playtimes.csv")
    }
}

/// Fails fast when a configured source directory is absent.
pub fn ensure_dir(path: &Path) -> Result<(), ConfigError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ConfigError::MissingDirectory {
            path: path.to_path_buf(),
        })
    }
}

/// Returns the platform-specific config directory for pt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pt"))
}

/// Returns the platform-specific data directory for pt.
///
/// On Linux: `~/.local/share/pt`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("pt"))
}

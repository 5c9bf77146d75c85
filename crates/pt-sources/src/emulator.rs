//! Adapter for the emulator's session logs.
//!
//! Unlike the counter sources, the emulator writes one log per session with
//! the loaded content path and a final runtime line. Sessions are therefore
//! already incremental: they aggregate straight into daily records with no
//! reconciliation pass. The session date is the `YYYY_MM_DD` fragment the
//! log-rotation scheme embeds in the file name.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use rayon::prelude::*;
use regex::Regex;

use pt_core::{DailyPlaytime, duration};

use crate::discover::DiscoverError;
use crate::parse::SourceError;

static CONTENT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[INFO\] \[Content\]: Loading content file: "(.*?)"\."#).unwrap());
static RUNTIME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[INFO\] \[Core\]: Content ran for a total of: (.*)\.").unwrap());
static FILE_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{4})_(\d{2})_(\d{2})").unwrap());
static REGION_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)|\s*\[[^\]]*\]").unwrap());

/// One completed emulator session.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    date: NaiveDate,
    title: String,
    runtime_secs: i64,
}

/// Result of scanning a tree of session logs.
#[derive(Debug, Clone, Default)]
pub struct EmulatorScan {
    /// Daily per-title records, sorted by date then title.
    pub records: Vec<DailyPlaytime>,
    /// Newest session date seen, for the combiner's alignment gate.
    pub latest_session: Option<NaiveDate>,
}

/// Scans every `*.log` under `root` and aggregates sessions into daily
/// records tagged with `platform`.
///
/// Sessions at or under `min_session_secs` are discarded as accidental
/// launches. Logs missing a content or runtime line are skipped with a
/// warning.
pub fn scan(
    root: &Path,
    platform: &str,
    min_session_secs: i64,
) -> Result<EmulatorScan, SourceError> {
    let root_str = root.to_str().ok_or_else(|| DiscoverError::InvalidRoot {
        root: root.to_path_buf(),
    })?;
    let pattern = format!("{root_str}/**/*.log");
    let files: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|source| DiscoverError::Glob {
            root: root.to_path_buf(),
            source,
        })?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        return Err(SourceError::Discover(DiscoverError::NoDataFound {
            root: root.to_path_buf(),
            extension: "log".to_string(),
        }));
    }

    let sessions: Vec<Session> = files
        .par_iter()
        .filter_map(|path| parse_log(path))
        .filter(|session| {
            if session.runtime_secs > min_session_secs {
                true
            } else {
                tracing::debug!(
                    title = %session.title,
                    secs = session.runtime_secs,
                    "discarding short session"
                );
                false
            }
        })
        .collect();

    tracing::info!(
        logs = files.len(),
        sessions = sessions.len(),
        root = %root.display(),
        "scanned emulator session logs"
    );

    let latest_session = sessions.iter().map(|s| s.date).max();

    // Sum per (date, title); per-session rounding matches how the sessions
    // were historically reported.
    let mut daily: BTreeMap<(NaiveDate, String), i64> = BTreeMap::new();
    for session in sessions {
        *daily.entry((session.date, session.title)).or_insert(0) +=
            (session.runtime_secs + 30) / 60;
    }

    let records = daily
        .into_iter()
        .filter(|&(_, mins)| mins > 0)
        .map(|((date, title), mins)| DailyPlaytime {
            date,
            name: title,
            id: None,
            playtime_mins: mins,
            platform: platform.to_string(),
            gap_flag: false,
        })
        .collect();

    Ok(EmulatorScan {
        records,
        latest_session,
    })
}

/// Extracts one session from a log file, or skips it with a warning.
fn parse_log(path: &Path) -> Option<Session> {
    // Logs are latin-1 in the wild; lossy decoding keeps the ASCII lines the
    // regexes care about intact.
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(file = %path.display(), reason = %err, "skipping unreadable log");
            return None;
        }
    };
    let contents = String::from_utf8_lossy(&bytes);

    let mut content_file = None;
    let mut runtime = None;
    for line in contents.lines() {
        if let Some(captures) = CONTENT_LINE.captures(line) {
            content_file = Some(captures[1].to_string());
        }
        if let Some(captures) = RUNTIME_LINE.captures(line) {
            runtime = Some(captures[1].to_string());
        }
    }

    let date = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(session_date);

    match (content_file, runtime, date) {
        (Some(content), Some(runtime), Some(date)) => Some(Session {
            date,
            title: rom_title(&content),
            runtime_secs: duration::long_form_to_seconds(&runtime),
        }),
        (content, runtime, date) => {
            tracing::warn!(
                file = %path.display(),
                has_content = content.is_some(),
                has_runtime = runtime.is_some(),
                has_date = date.is_some(),
                "skipping incomplete session log"
            );
            None
        }
    }
}

/// Session date from the `YYYY_MM_DD` fragment of a log file name.
fn session_date(file_name: &str) -> Option<NaiveDate> {
    let captures = FILE_DATE.captures(file_name)?;
    NaiveDate::from_ymd_opt(
        captures[1].parse().ok()?,
        captures[2].parse().ok()?,
        captures[3].parse().ok()?,
    )
}

/// Cleans a ROM path into a display title: basename without extension,
/// region/dump tags stripped, a trailing `, The` rotated to the front.
fn rom_title(rom_path: &str) -> String {
    let base = Path::new(rom_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(rom_path);
    let stripped = REGION_TAGS.replace_all(base, "");
    let title = stripped.trim();
    if title.contains(", The") {
        format!("The {}", title.replace(", The", ""))
    } else {
        title.to_string()
    }
}

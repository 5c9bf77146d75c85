//! Merging the per-source timelines into one.
//!
//! Sources are captured independently; combining a fresh source with a stale
//! one would silently misattribute the stale source's tail. The gate is a
//! hard precondition: every source's latest extract date must be identical
//! before any merging happens.

use chrono::NaiveDate;
use thiserror::Error;

use crate::snapshot::DailyPlaytime;

/// One source's contribution to the combined timeline.
#[derive(Debug, Clone)]
pub struct SourceWindow {
    /// Source label, used in error messages and logs.
    pub source: String,
    /// Latest capture date in the source's raw snapshot set.
    pub latest_extract: NaiveDate,
    /// The source's reconciled, identity-resolved records.
    pub records: Vec<DailyPlaytime>,
}

/// The sources' observation windows are not aligned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("latest extract dates disagree across sources: {}", format_windows(.windows))]
pub struct AlignmentError {
    /// Each source with its latest extract date, for the operator to see
    /// which one needs a re-run.
    pub windows: Vec<(String, NaiveDate)>,
}

fn format_windows(windows: &[(String, NaiveDate)]) -> String {
    windows
        .iter()
        .map(|(source, date)| format!("{source}={date}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Unions the sources' records into one chronologically sorted timeline.
///
/// Fails with [`AlignmentError`] unless every window's latest extract date is
/// identical. Interior per-entity dates may differ freely; only the window
/// edge is gated. Records are never deduplicated — sources cover disjoint
/// platforms by construction.
pub fn combine(windows: Vec<SourceWindow>) -> Result<Vec<DailyPlaytime>, AlignmentError> {
    let mut latest = windows.iter().map(|w| w.latest_extract);
    if let Some(first) = latest.next() {
        if latest.any(|date| date != first) {
            return Err(AlignmentError {
                windows: windows
                    .into_iter()
                    .map(|w| (w.source, w.latest_extract))
                    .collect(),
            });
        }
    }

    let mut combined: Vec<DailyPlaytime> = windows.into_iter().flat_map(|w| w.records).collect();
    combined.sort_by_key(|r| r.date);
    Ok(combined)
}

//! Snapshot and daily-record models shared by every pipeline stage.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One observation of a cumulative playtime counter.
///
/// Produced by a source adapter from a raw extract file and immutable from
/// then on. `observed_at` is the extract's capture date, not the play date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Entity name in the source's native spelling.
    pub name: String,
    /// Platform tag the counter belongs to.
    pub platform: String,
    /// First-party catalog id, for sources whose exports already carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Cumulative playtime in minutes at `observed_at`.
    pub total_minutes: i64,
    /// Capture date of the extract this observation came from.
    pub observed_at: NaiveDate,
}

/// One reconciled day of play for one entity.
///
/// `playtime_mins` is always positive; zero and negative deltas never become
/// records. Created by the reconciler (or directly by session-based sources),
/// optionally annotated with a catalog id by the matcher, and consumed
/// unchanged by the combiner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPlaytime {
    /// The day the play is attributed to: the capture date preceding the
    /// observation that confirmed it.
    pub date: NaiveDate,
    pub name: String,
    /// Catalog id, where known.
    pub id: Option<String>,
    pub playtime_mins: i64,
    /// Platform or source tag.
    pub platform: String,
    /// True when the interval producing this record spanned more than one
    /// calendar day, so the play may belong to any day inside it.
    pub gap_flag: bool,
}

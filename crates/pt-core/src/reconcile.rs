//! Delta reconciliation: cumulative counters to per-day playtime.
//!
//! Sources capture each game's *total* playtime at irregular intervals. This
//! module turns those observations into incremental records:
//!
//! 1. Group snapshots by `(name, platform)` and sort each group by capture
//!    date.
//! 2. For each adjacent pair, the positive difference in totals is one day of
//!    play, attributed to the earlier capture date (the play finished before
//!    the later observation confirmed it).
//! 3. Zero deltas mean no play; negative deltas mean the counter reset (save
//!    reimport, profile wipe) and are discarded rather than clipped —
//!    underreporting beats fabricating playtime.
//!
//! A record's `gap_flag` is set when its pair of observations is more than
//! one calendar day apart. Independently, the distinct capture dates of the
//! whole source are scanned for gaps so the caller can warn about missing
//! extracts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::snapshot::{DailyPlaytime, Snapshot};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Two snapshots of the same entity share a capture date. The upstream
    /// extract was captured twice into one period; ordering between the two
    /// totals would be arbitrary, so the source must be fixed instead.
    #[error("duplicate observation for '{name}' ({platform}) at {observed_at}")]
    DuplicateObservation {
        name: String,
        platform: String,
        observed_at: NaiveDate,
    },
}

/// A hole in a source's capture sequence: no extract for one or more days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodGap {
    /// Last capture date before the hole.
    pub from: NaiveDate,
    /// First capture date after the hole.
    pub to: NaiveDate,
    /// Calendar days between the two captures (always > 1).
    pub days: i64,
}

/// Output of one source's reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Per-day records, sorted by date then name.
    pub records: Vec<DailyPlaytime>,
    /// Gaps in the source's capture sequence, for operator warnings.
    pub period_gaps: Vec<PeriodGap>,
}

/// Reconciles one source's snapshots into daily playtime records.
///
/// An entity with a single snapshot has no adjacent pair and yields nothing;
/// that is expected, not an error. An empty input yields an empty result.
pub fn reconcile(snapshots: &[Snapshot]) -> Result<Reconciliation, ReconcileError> {
    // BTreeMap keeps group iteration deterministic.
    let mut groups: BTreeMap<(&str, &str), Vec<&Snapshot>> = BTreeMap::new();
    for snap in snapshots {
        groups
            .entry((snap.name.as_str(), snap.platform.as_str()))
            .or_default()
            .push(snap);
    }

    let mut records = Vec::new();
    for ((name, platform), mut group) in groups {
        group.sort_by_key(|s| s.observed_at);

        for pair in group.windows(2) {
            let (earlier, later) = (pair[0], pair[1]);
            if earlier.observed_at == later.observed_at {
                return Err(ReconcileError::DuplicateObservation {
                    name: name.to_string(),
                    platform: platform.to_string(),
                    observed_at: earlier.observed_at,
                });
            }

            let delta = later.total_minutes - earlier.total_minutes;
            if delta <= 0 {
                if delta < 0 {
                    tracing::warn!(
                        name,
                        platform,
                        delta,
                        observed_at = %later.observed_at,
                        "counter decreased; discarding delta"
                    );
                }
                continue;
            }

            let span_days = (later.observed_at - earlier.observed_at).num_days();
            records.push(DailyPlaytime {
                date: earlier.observed_at,
                name: name.to_string(),
                id: later.id.clone().or_else(|| earlier.id.clone()),
                playtime_mins: delta,
                platform: platform.to_string(),
                gap_flag: span_days > 1,
            });
        }
    }

    records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));

    Ok(Reconciliation {
        period_gaps: period_gaps(snapshots),
        records,
    })
}

/// Scans the distinct capture dates of a whole source for day-level holes.
#[must_use]
pub fn period_gaps(snapshots: &[Snapshot]) -> Vec<PeriodGap> {
    let mut dates: Vec<NaiveDate> = snapshots.iter().map(|s| s.observed_at).collect();
    dates.sort_unstable();
    dates.dedup();

    dates
        .windows(2)
        .filter_map(|pair| {
            let days = (pair[1] - pair[0]).num_days();
            (days > 1).then_some(PeriodGap {
                from: pair[0],
                to: pair[1],
                days,
            })
        })
        .collect()
}

/// Latest capture date across a source's snapshots, if any.
#[must_use]
pub fn latest_observation(snapshots: &[Snapshot]) -> Option<NaiveDate> {
    snapshots.iter().map(|s| s.observed_at).max()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snap(name: &str, total: i64, observed: NaiveDate) -> Snapshot {
        Snapshot {
            name: name.into(),
            platform: "PC".into(),
            id: None,
            total_minutes: total,
            observed_at: observed,
        }
    }

    #[test]
    fn adjacent_pair_produces_one_delta() {
        let snaps = vec![
            snap("A", 100, date(2025, 1, 1)),
            snap("A", 160, date(2025, 1, 2)),
        ];
        let result = reconcile(&snaps).unwrap();
        assert_eq!(result.records.len(), 1);
        let rec = &result.records[0];
        assert_eq!(rec.date, date(2025, 1, 1));
        assert_eq!(rec.playtime_mins, 60);
        assert!(!rec.gap_flag);
    }

    #[test]
    fn zero_delta_is_suppressed() {
        // 100 @ Jan 1, 160 @ Jan 2, 160 @ Jan 3 -> only the Jan 1 record.
        let snaps = vec![
            snap("A", 100, date(2025, 1, 1)),
            snap("A", 160, date(2025, 1, 2)),
            snap("A", 160, date(2025, 1, 3)),
        ];
        let result = reconcile(&snaps).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].date, date(2025, 1, 1));
        assert_eq!(result.records[0].playtime_mins, 60);
    }

    #[test]
    fn negative_delta_is_discarded_not_clipped() {
        let snaps = vec![
            snap("A", 500, date(2025, 1, 1)),
            snap("A", 20, date(2025, 1, 2)),
            snap("A", 50, date(2025, 1, 3)),
        ];
        let result = reconcile(&snaps).unwrap();
        // The reset is dropped; the post-reset increase survives.
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].date, date(2025, 1, 2));
        assert_eq!(result.records[0].playtime_mins, 30);
    }

    #[test]
    fn gap_flag_set_for_multi_day_interval() {
        // 30 @ Jan 1, 90 @ Jan 5 -> (Jan 1, 60, gap).
        let snaps = vec![
            snap("B", 30, date(2025, 1, 1)),
            snap("B", 90, date(2025, 1, 5)),
        ];
        let result = reconcile(&snaps).unwrap();
        assert_eq!(result.records.len(), 1);
        let rec = &result.records[0];
        assert_eq!(rec.date, date(2025, 1, 1));
        assert_eq!(rec.playtime_mins, 60);
        assert!(rec.gap_flag);
    }

    #[test]
    fn single_snapshot_yields_nothing() {
        let snaps = vec![snap("A", 100, date(2025, 1, 1))];
        let result = reconcile(&snaps).unwrap();
        assert!(result.records.is_empty());
    }

    #[test]
    fn first_observation_never_becomes_a_record() {
        // A new game appearing mid-sequence must not attribute its whole
        // cumulative total to one day.
        let snaps = vec![
            snap("A", 10, date(2025, 1, 1)),
            snap("A", 20, date(2025, 1, 2)),
            snap("New Game", 900, date(2025, 1, 2)),
        ];
        let result = reconcile(&snaps).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].name, "A");
    }

    #[test]
    fn groups_are_isolated_by_platform() {
        let mut a = snap("A", 100, date(2025, 1, 1));
        a.platform = "Console".into();
        let snaps = vec![a, snap("A", 160, date(2025, 1, 2))];
        // One snapshot per group: no pairs anywhere.
        let result = reconcile(&snaps).unwrap();
        assert!(result.records.is_empty());
    }

    #[test]
    fn duplicate_observation_is_rejected() {
        let snaps = vec![
            snap("A", 100, date(2025, 1, 1)),
            snap("A", 120, date(2025, 1, 1)),
        ];
        let err = reconcile(&snaps).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::DuplicateObservation {
                name: "A".into(),
                platform: "PC".into(),
                observed_at: date(2025, 1, 1),
            }
        );
    }

    #[test]
    fn id_is_carried_through() {
        let mut s1 = snap("A", 100, date(2025, 1, 1));
        let mut s2 = snap("A", 160, date(2025, 1, 2));
        s1.id = Some("game-7".into());
        s2.id = Some("game-7".into());
        let result = reconcile(&[s1, s2]).unwrap();
        assert_eq!(result.records[0].id.as_deref(), Some("game-7"));
    }

    #[test]
    fn records_sorted_by_date_then_name() {
        let snaps = vec![
            snap("B", 10, date(2025, 1, 2)),
            snap("B", 30, date(2025, 1, 3)),
            snap("A", 100, date(2025, 1, 1)),
            snap("A", 160, date(2025, 1, 2)),
            snap("A", 200, date(2025, 1, 3)),
        ];
        let result = reconcile(&snaps).unwrap();
        let keys: Vec<_> = result
            .records
            .iter()
            .map(|r| (r.date, r.name.clone()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn period_gap_scan_reports_holes() {
        let snaps = vec![
            snap("A", 10, date(2025, 1, 1)),
            snap("A", 20, date(2025, 1, 2)),
            snap("A", 30, date(2025, 1, 6)),
        ];
        let gaps = period_gaps(&snaps);
        assert_eq!(
            gaps,
            vec![PeriodGap {
                from: date(2025, 1, 2),
                to: date(2025, 1, 6),
                days: 4,
            }]
        );
    }

    #[test]
    fn empty_input_is_empty_output() {
        let result = reconcile(&[]).unwrap();
        assert!(result.records.is_empty());
        assert!(result.period_gaps.is_empty());
        assert_eq!(latest_observation(&[]), None);
    }

    #[test]
    fn latest_observation_is_max_date() {
        let snaps = vec![
            snap("A", 10, date(2025, 1, 3)),
            snap("B", 10, date(2025, 1, 9)),
            snap("C", 10, date(2025, 1, 5)),
        ];
        assert_eq!(latest_observation(&snaps), Some(date(2025, 1, 9)));
    }
}

//! Fuzzy resolution of source-side titles against the canonical catalog.
//!
//! Console and emulator exports spell titles however they like ("Legend of
//! Zelda: TOTK", ROM file names); the catalog is authoritative. Candidates
//! are scoped to the platforms a source can produce, then scored with a
//! normalized similarity ratio. Anything under the acceptance threshold is
//! reported unmatched rather than forced onto a low-confidence id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::snapshot::DailyPlaytime;

/// Default minimum similarity score for a match, on the 0–100 scale.
pub const DEFAULT_MATCH_THRESHOLD: u8 = 80;

/// Canonical identity for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Opaque, stable identifier.
    pub id: String,
    pub name: String,
    /// Platform tags this entry is valid under.
    pub platforms: Vec<String>,
}

/// The canonical game catalog. Read-only.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    #[must_use]
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries tagged with at least one of the given platforms.
    fn scoped<'a>(&'a self, platforms: &[String]) -> Vec<&'a CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.platforms.iter().any(|p| platforms.contains(p)))
            .collect()
    }
}

/// Result of resolving one source's records against the catalog.
#[derive(Debug, Clone, Default)]
pub struct MatchReport {
    /// Records whose names matched, annotated with the catalog id.
    pub matched: Vec<DailyPlaytime>,
    /// Distinct names that scored under the threshold, for bulk review.
    pub unmatched: Vec<String>,
}

/// Lowercases, strips punctuation, and collapses whitespace.
fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_space = true;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Similarity of two titles on a 0–100 scale, case- and
/// punctuation-insensitive.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "ratio is clamped to [0, 100] before truncation"
)]
pub fn similarity(a: &str, b: &str) -> u8 {
    let ratio = strsim::normalized_levenshtein(&normalize(a), &normalize(b));
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Best catalog candidate for a name, with its score.
///
/// Equal scores resolve to the lexicographically smallest catalog id so that
/// near-identical titles match deterministically.
fn best_candidate<'a>(name: &str, candidates: &[&'a CatalogEntry]) -> Option<(&'a CatalogEntry, u8)> {
    candidates
        .iter()
        .map(|entry| (*entry, similarity(name, &entry.name)))
        .max_by(|(ea, sa), (eb, sb)| sa.cmp(sb).then_with(|| eb.id.cmp(&ea.id)))
}

/// Resolves each record's name to a catalog id, scoped to `platforms`.
///
/// Records whose best score is under `threshold` are dropped from the matched
/// output; their names are collected (deduplicated, in first-seen order) so
/// an operator can review catalog/source naming mismatches in bulk. Pure
/// lookup: no side effects beyond logging.
#[must_use]
pub fn resolve(
    records: Vec<DailyPlaytime>,
    catalog: &Catalog,
    platforms: &[String],
    threshold: u8,
) -> MatchReport {
    let candidates = catalog.scoped(platforms);
    tracing::debug!(
        candidates = candidates.len(),
        ?platforms,
        "scoped catalog for matching"
    );

    let mut resolved: HashMap<String, Option<String>> = HashMap::new();
    let mut report = MatchReport::default();

    for mut record in records {
        let outcome = resolved
            .entry(record.name.clone())
            .or_insert_with(|| {
                best_candidate(&record.name, &candidates)
                    .filter(|(_, score)| *score >= threshold)
                    .map(|(entry, score)| {
                        tracing::debug!(name = %record.name, id = %entry.id, score, "matched");
                        entry.id.clone()
                    })
            })
            .clone();

        match outcome {
            Some(id) => {
                record.id = Some(id);
                report.matched.push(record);
            }
            None => {
                if !report.unmatched.contains(&record.name) {
                    report.unmatched.push(record.name.clone());
                }
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn entry(id: &str, name: &str, platforms: &[&str]) -> CatalogEntry {
        CatalogEntry {
            id: id.into(),
            name: name.into(),
            platforms: platforms.iter().map(ToString::to_string).collect(),
        }
    }

    fn record(name: &str) -> DailyPlaytime {
        DailyPlaytime {
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            name: name.into(),
            id: None,
            playtime_mins: 30,
            platform: "Console".into(),
            gap_flag: false,
        }
    }

    fn console() -> Vec<String> {
        vec!["Console".to_string()]
    }

    #[test]
    fn similarity_ignores_case_and_punctuation() {
        assert_eq!(similarity("Hollow Knight", "hollow knight!"), 100);
        assert_eq!(similarity("OCTOPATH TRAVELER", "Octopath Traveler"), 100);
    }

    #[test]
    fn exact_name_matches() {
        let catalog = Catalog::new(vec![entry("g1", "Hades", &["Console"])]);
        let report = resolve(vec![record("Hades")], &catalog, &console(), 80);
        assert_eq!(report.matched.len(), 1);
        assert_eq!(report.matched[0].id.as_deref(), Some("g1"));
        assert!(report.unmatched.is_empty());
    }

    #[test]
    fn platform_scoping_excludes_other_platforms() {
        let catalog = Catalog::new(vec![entry("g1", "Hades", &["PC"])]);
        let report = resolve(vec![record("Hades")], &catalog, &console(), 80);
        assert!(report.matched.is_empty());
        assert_eq!(report.unmatched, vec!["Hades".to_string()]);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let catalog = Catalog::new(vec![entry("g1", "Metroid Dread", &["Console"])]);
        let name = "Metroid Drea";
        let score = similarity(name, "Metroid Dread");

        let at = resolve(vec![record(name)], &catalog, &console(), score);
        assert_eq!(at.matched.len(), 1, "score == threshold must match");

        let below = resolve(vec![record(name)], &catalog, &console(), score + 1);
        assert!(below.matched.is_empty(), "score < threshold must not match");

        let above = resolve(vec![record(name)], &catalog, &console(), score - 1);
        assert_eq!(above.matched.len(), 1, "score > threshold must match");
    }

    #[test]
    fn tie_breaks_on_smallest_id() {
        let catalog = Catalog::new(vec![
            entry("g9", "Doom", &["Console"]),
            entry("g2", "Doom", &["Console"]),
        ]);
        let report = resolve(vec![record("Doom")], &catalog, &console(), 80);
        assert_eq!(report.matched[0].id.as_deref(), Some("g2"));
    }

    #[test]
    fn unmatched_names_are_collected_once() {
        let catalog = Catalog::new(vec![entry("g1", "Celeste", &["Console"])]);
        let records = vec![record("Unknown Title"), record("Unknown Title")];
        let report = resolve(records, &catalog, &console(), 80);
        assert_eq!(report.unmatched, vec!["Unknown Title".to_string()]);
    }

    #[test]
    fn empty_catalog_matches_nothing() {
        let catalog = Catalog::default();
        let report = resolve(vec![record("Hades")], &catalog, &console(), 80);
        assert!(report.matched.is_empty());
        assert_eq!(report.unmatched.len(), 1);
    }

    #[test]
    fn noisy_title_still_matches() {
        let catalog = Catalog::new(vec![entry(
            "g1",
            "The Legend of Zelda: Tears of the Kingdom",
            &["Console"],
        )]);
        let report = resolve(
            vec![record("Legend of Zelda Tears of the Kingdom")],
            &catalog,
            &console(),
            80,
        );
        assert_eq!(report.matched.len(), 1);
    }
}

//! Core reconciliation logic for the playtime tracker.
//!
//! This crate contains the pure domain logic:
//! - Duration parsing: source-native playtime strings to integer units
//! - Delta reconciliation: cumulative counters to per-day increments
//! - Identity matching: fuzzy resolution of titles against the catalog
//! - Cross-source combination: alignment-gated union of timelines
//!
//! All I/O (extract discovery, CSV parsing, output) lives in `pt-sources`.

pub mod combine;
pub mod duration;
pub mod matcher;
pub mod reconcile;
mod snapshot;

pub use combine::{AlignmentError, SourceWindow, combine};
pub use matcher::{Catalog, CatalogEntry, DEFAULT_MATCH_THRESHOLD, MatchReport, resolve};
pub use reconcile::{PeriodGap, ReconcileError, Reconciliation, latest_observation, reconcile};
pub use snapshot::{DailyPlaytime, Snapshot};

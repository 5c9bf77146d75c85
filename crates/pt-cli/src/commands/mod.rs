//! Command implementations.

pub mod all;
pub mod combine;
pub mod console;
pub mod emulator;
pub mod launcher;

use std::path::Path;

use anyhow::{Context, Result};

use pt_core::Snapshot;

/// Shared reconciliation path for the cumulative-counter sources.
///
/// Both counter sources differ only in how their raw extracts are parsed;
/// from snapshots onward the pipeline is identical: reconcile, surface
/// capture gaps, write the per-source daily CSV.
pub(crate) fn reconcile_and_write(
    label: &str,
    snapshots: &[Snapshot],
    output: &Path,
) -> Result<()> {
    let reconciliation = pt_core::reconcile(snapshots)
        .with_context(|| format!("failed to reconcile {label} snapshots"))?;

    for gap in &reconciliation.period_gaps {
        tracing::warn!(
            source = label,
            from = %gap.from,
            to = %gap.to,
            days = gap.days,
            "gap between extracts; if nothing was played, copy the previous extract to fill it"
        );
    }

    pt_sources::write_records(output, &reconciliation.records)
        .with_context(|| format!("failed to write {label} daily playtime"))?;

    tracing::info!(
        source = label,
        snapshots = snapshots.len(),
        records = reconciliation.records.len(),
        "source pipeline complete"
    );
    Ok(())
}

/// One aggregate warning per source for names the catalog could not resolve,
/// so mismatches can be reviewed in bulk rather than one record at a time.
pub(crate) fn warn_unmatched(label: &str, unmatched: &[String]) {
    if !unmatched.is_empty() {
        tracing::warn!(
            source = label,
            count = unmatched.len(),
            titles = ?unmatched,
            "titles below the match threshold were dropped from combined output"
        );
    }
}

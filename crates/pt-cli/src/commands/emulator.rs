//! The emulator source pipeline: scan session logs, aggregate, write.
//!
//! Session logs are already incremental, so there is no reconciliation pass
//! and no gap flag for this source.

use anyhow::{Context, Result};

use crate::config::{self, Config};

pub fn run(config: &Config) -> Result<()> {
    tracing::info!("beginning emulator playtime pipeline");
    config::ensure_dir(&config.emulator.raw_dir)?;

    let scan = pt_sources::emulator::scan(
        &config.emulator.raw_dir,
        &config.emulator.platform,
        config.emulator.min_session_secs,
    )
    .context("failed to scan emulator session logs")?;

    pt_sources::write_records(&config.emulator_daily_file(), &scan.records)
        .context("failed to write emulator daily playtime")?;

    tracing::info!(records = scan.records.len(), "source pipeline complete");
    Ok(())
}

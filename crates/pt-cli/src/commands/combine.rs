//! The cross-source combine stage.
//!
//! Recomputes each source's latest extract date from its raw data (the
//! processed CSVs only hold attributed play dates, which trail the capture
//! window by one period), gates alignment, fuzzy-matches the sources that
//! lack first-party ids, and writes the unioned timeline.

use anyhow::{Context, Result};

use pt_core::SourceWindow;

use crate::config::{self, Config};

pub fn run(config: &Config) -> Result<()> {
    tracing::info!("beginning combined playtime pipeline");
    config::ensure_dir(&config.launcher.raw_dir)?;
    config::ensure_dir(&config.console.raw_dir)?;
    config::ensure_dir(&config.emulator.raw_dir)?;

    let catalog =
        pt_sources::load_catalog(&config.catalog.path).context("failed to load catalog")?;

    // Latest capture date per source, from the raw snapshot sets.
    let launcher_snapshots = pt_sources::launcher::load(
        &config.launcher.raw_dir,
        config.launcher.selection,
        &config.console.platforms,
    )
    .context("failed to load launcher extracts")?;
    let console_snapshots =
        pt_sources::console::load(&config.console.raw_dir, config.console.selection)
            .context("failed to load console extracts")?;
    let emulator_scan = pt_sources::emulator::scan(
        &config.emulator.raw_dir,
        &config.emulator.platform,
        config.emulator.min_session_secs,
    )
    .context("failed to scan emulator session logs")?;

    let launcher_latest = pt_core::latest_observation(&launcher_snapshots)
        .context("launcher raw data has no observations")?;
    let console_latest = pt_core::latest_observation(&console_snapshots)
        .context("console raw data has no observations")?;
    let emulator_latest = emulator_scan
        .latest_session
        .context("emulator raw data has no sessions")?;

    // Per-source daily records written by the source pipelines.
    let launcher_records = pt_sources::read_records(&config.launcher_daily_file())
        .context("failed to read launcher daily playtime; run `pt launcher` first")?;
    let console_records = pt_sources::read_records(&config.console_daily_file())
        .context("failed to read console daily playtime; run `pt console` first")?;
    let emulator_records = pt_sources::read_records(&config.emulator_daily_file())
        .context("failed to read emulator daily playtime; run `pt emulator` first")?;

    // The launcher's records carry first-party ids; the other two resolve
    // against the catalog.
    let console_report = pt_core::resolve(
        console_records,
        &catalog,
        &config.console.platforms,
        config.catalog.match_threshold,
    );
    super::warn_unmatched("console", &console_report.unmatched);

    let emulator_platforms = vec![config.emulator.platform.clone()];
    let emulator_report = pt_core::resolve(
        emulator_records,
        &catalog,
        &emulator_platforms,
        config.catalog.match_threshold,
    );
    super::warn_unmatched("emulator", &emulator_report.unmatched);

    let combined = pt_core::combine(vec![
        SourceWindow {
            source: "launcher".to_string(),
            latest_extract: launcher_latest,
            records: launcher_records,
        },
        SourceWindow {
            source: "console".to_string(),
            latest_extract: console_latest,
            records: console_report.matched,
        },
        SourceWindow {
            source: "emulator".to_string(),
            latest_extract: emulator_latest,
            records: emulator_report.matched,
        },
    ])?;

    pt_sources::write_records(&config.combined_daily_file(), &combined)
        .context("failed to write combined daily playtime")?;

    tracing::info!(
        records = combined.len(),
        path = %config.combined_daily_file().display(),
        "combined pipeline complete"
    );
    Ok(())
}

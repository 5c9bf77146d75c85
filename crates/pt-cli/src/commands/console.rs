//! The console source pipeline: discover, normalize, reconcile, write.

use anyhow::{Context, Result};

use crate::config::{self, Config};

pub fn run(config: &Config) -> Result<()> {
    tracing::info!("beginning console playtime pipeline");
    config::ensure_dir(&config.console.raw_dir)?;

    let snapshots =
        pt_sources::console::load(&config.console.raw_dir, config.console.selection)
            .context("failed to load console extracts")?;

    super::reconcile_and_write("console", &snapshots, &config.console_daily_file())?;
    Ok(())
}

//! The launcher source pipeline: discover, normalize, reconcile, write.

use anyhow::{Context, Result};

use crate::config::{self, Config};

pub fn run(config: &Config) -> Result<()> {
    tracing::info!("beginning launcher playtime pipeline");
    config::ensure_dir(&config.launcher.raw_dir)?;

    let snapshots = pt_sources::launcher::load(
        &config.launcher.raw_dir,
        config.launcher.selection,
        &config.console.platforms,
    )
    .context("failed to load launcher extracts")?;

    super::reconcile_and_write("launcher", &snapshots, &config.launcher_daily_file())?;
    Ok(())
}

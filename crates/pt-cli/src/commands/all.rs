//! The orchestrator: every source pipeline, then combine.

use anyhow::Result;

use crate::config::Config;

use super::{combine, console, emulator, launcher};

pub fn run(config: &Config) -> Result<()> {
    tracing::info!("beginning daily playtime orchestration");

    launcher::run(config)?;
    console::run(config)?;
    emulator::run(config)?;
    combine::run(config)?;

    tracing::info!("orchestration complete: all daily playtime pipelines have finished");
    Ok(())
}

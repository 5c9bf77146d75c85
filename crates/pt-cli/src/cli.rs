//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Daily playtime aggregator.
///
/// Reconciles periodic playtime extracts from a PC launcher, a scraped
/// console profile, and emulator session logs into one daily timeline.
#[derive(Debug, Parser)]
#[command(name = "pt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile the PC launcher's library exports into daily playtime.
    Launcher,

    /// Reconcile the scraped console-profile exports into daily playtime.
    Console,

    /// Aggregate emulator session logs into daily playtime.
    Emulator,

    /// Match titles against the catalog and merge all sources.
    Combine,

    /// Run every source pipeline, then combine.
    All,
}

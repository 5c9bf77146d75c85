use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pt_cli::commands::{all, combine, console, emulator, launcher};
use pt_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    match command {
        Commands::Launcher => launcher::run(&config),
        Commands::Console => console::run(&config),
        Commands::Emulator => emulator::run(&config),
        Commands::Combine => combine::run(&config),
        Commands::All => all::run(&config),
    }
}

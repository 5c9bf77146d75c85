//! CLI surface for the playtime tracker.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Commands};
pub use config::Config;

//! Command dispatch and handlers.

pub mod check;
pub mod once;
pub mod run;
pub mod seen;

use crate::cli::{Command, ConfigArgs};
use crate::config::{Config, ConfigLoader};

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Run { config } => run::run(&load(config)?),
        Command::Once { config, ignore_window } => once::run(&load(config)?, *ignore_window),
        Command::CheckConfig { config } => check::run(&config.config),
        Command::Seen { repo, config } => seen::run(&load(config)?, repo),
    }
}

fn load(args: &ConfigArgs) -> Result<Config, String> {
    ConfigLoader::load(Some(&args.config))
        .map_err(|e| format!("Invalid configuration {}: {e}", args.config.display()))
}

/// Single-threaded runtime for the pipeline; every step is awaited in turn.
fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))
}

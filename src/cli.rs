//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for `herald`.
#[derive(Debug, Parser)]
#[command(
    name = "herald",
    version,
    about = "Watch GitHub repositories and announce new issues in a chat group"
)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Path to the YAML configuration file.
    #[arg(long, short, env = "HERALD_CONFIG", default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll on the configured interval until interrupted.
    Run {
        /// Configuration source.
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Run a single cycle and print its outcome.
    Once {
        /// Configuration source.
        #[command(flatten)]
        config: ConfigArgs,
        /// Run even outside the active window.
        #[arg(long)]
        ignore_window: bool,
    },
    /// Load and validate the configuration, then exit.
    CheckConfig {
        /// Configuration source.
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Show the seen-set recorded for one repository.
    Seen {
        /// Repository as `owner/name`.
        repo: String,
        /// Configuration source.
        #[command(flatten)]
        config: ConfigArgs,
    },
}

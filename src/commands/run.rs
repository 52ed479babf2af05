//! `herald run` command.

use tracing::{info, warn};

use crate::config::Config;
use crate::context::ServiceContext;
use crate::logging;
use crate::pipeline::{scheduler::run_schedule, Pipeline};

/// Execute the `run` command.
///
/// Runs a cycle immediately, then one per configured interval, until
/// Ctrl-C.
///
/// # Errors
///
/// Returns an error string if logging, the HTTP clients or the runtime
/// cannot be set up.
pub fn run(config: &Config) -> Result<(), String> {
    let _guard = logging::init(&config.logging)?;
    let ctx = ServiceContext::live(config)?;
    let mut pipeline = Pipeline::new(&ctx, config).map_err(|e| e.to_string())?;
    let interval = config.schedule.interval();

    info!(
        repositories = config.github.repos.len(),
        start = %config.schedule.start_time,
        end = %config.schedule.end_time,
        interval_minutes = config.schedule.interval_minutes,
        "herald starting"
    );

    super::runtime()?.block_on(run_schedule(&mut pipeline, interval, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C, stopping");
        }
    }));
    Ok(())
}

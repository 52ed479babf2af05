//! `herald once` command.

use crate::config::Config;
use crate::context::ServiceContext;
use crate::logging;
use crate::pipeline::{CycleOptions, Pipeline};

/// Execute the `once` command: a single cycle, then print its report.
///
/// # Errors
///
/// Returns an error string if setup fails. Failures inside the cycle are
/// reported in the printed counters, not as an error.
pub fn run(config: &Config, ignore_window: bool) -> Result<(), String> {
    let _guard = logging::init(&config.logging)?;
    let ctx = ServiceContext::live(config)?;
    let mut pipeline = Pipeline::new(&ctx, config).map_err(|e| e.to_string())?;

    let report =
        super::runtime()?.block_on(pipeline.run_cycle(CycleOptions { ignore_window }));
    println!("{report}");
    Ok(())
}

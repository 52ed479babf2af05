//! Fixed-interval loop invoking the pipeline.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::pipeline::orchestrator::{CycleOptions, Pipeline};

/// Runs a cycle immediately and then once per `interval` until `shutdown`
/// completes.
///
/// Each tick awaits the whole cycle before the next tick is considered, and
/// ticks missed while a cycle was running are skipped rather than bunched
/// up, so cycles never overlap. A shutdown request aborts the cycle in
/// flight; seen-set appends are single-line writes and stay consistent.
pub async fn run_schedule<F>(pipeline: &mut Pipeline<'_>, interval: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    info!(interval_secs = interval.as_secs(), "scheduler started");
    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!(cycles = pipeline.cycles_run(), "shutdown requested, scheduler stopped");
                break;
            }
            report = async {
                ticker.tick().await;
                pipeline.run_cycle(CycleOptions::default()).await
            } => {
                info!(report = %report, "cycle complete");
            }
        }
    }
}

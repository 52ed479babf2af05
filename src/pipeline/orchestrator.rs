//! Pipeline orchestrator: one poll cycle from window check to delivery.
//!
//! ```text
//! IDLE -> CHECK_WINDOW -> (skip | FETCH) -> SUMMARIZE_EACH -> NOTIFY_EACH -> IDLE
//! ```
//!
//! Everything is awaited one call at a time. Failures are absorbed at the
//! narrowest scope: a repository for fetch errors, an issue for delivery
//! errors.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveTime;
use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{Config, ConfigError, PacingConfig};
use crate::context::ServiceContext;
use crate::error::RemoteError;
use crate::pipeline::fetcher::IssueFetcher;
use crate::pipeline::notifier::Notifier;
use crate::pipeline::summarizer::{Summarizer, Summary};
use crate::pipeline::window::ActiveWindow;
use crate::ports::{Issue, RepositoryHandle, Sleeper};
use crate::store::SeenStore;

/// Per-invocation switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleOptions {
    /// Run even when the current time is outside the active window.
    pub ignore_window: bool,
}

/// Counters for one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleStats {
    /// Repositories queried.
    pub repositories: usize,
    /// Repositories whose seen-set or listing could not be read.
    pub repositories_failed: usize,
    /// Issues above the max-known number, queued for notification.
    pub eligible: usize,
    /// Cards acknowledged by the webhook.
    pub delivered: usize,
    /// Cards that were not acknowledged.
    pub delivery_failures: usize,
    /// Delivered cards whose number could not be persisted.
    pub record_failures: usize,
    /// Eligible issues left for the next cycle after an earlier failure.
    pub deferred: usize,
    /// Older unseen issues recorded without a notification.
    pub backfilled: usize,
    /// Cards sent with the placeholder instead of a summary.
    pub summaries_unavailable: usize,
}

/// Result of [`Pipeline::run_cycle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// Outside the active window; nothing was fetched or recorded.
    Skipped {
        /// Local time the window was checked against.
        local_time: NaiveTime,
    },
    /// The cycle ran to completion.
    Completed(CycleStats),
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped { local_time } => {
                write!(f, "skipped: {} is outside the active window", local_time.format("%H:%M"))
            }
            Self::Completed(stats) => write!(
                f,
                "repositories: {} ({} failed), eligible: {}, delivered: {}, failed: {}, \
                 deferred: {}, backfilled: {}, without summary: {}",
                stats.repositories,
                stats.repositories_failed,
                stats.eligible,
                stats.delivered,
                stats.delivery_failures,
                stats.deferred,
                stats.backfilled,
                stats.summaries_unavailable,
            ),
        }
    }
}

/// Drives poll cycles over the configured repositories.
///
/// `run_cycle` borrows the pipeline mutably, so one pipeline can never run
/// two cycles at the same time; the seen-set has a single writer.
pub struct Pipeline<'a> {
    ctx: &'a ServiceContext,
    config: &'a Config,
    window: ActiveWindow,
    cycles_run: u64,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline over the given ports and configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured window cannot be parsed.
    pub fn new(ctx: &'a ServiceContext, config: &'a Config) -> Result<Self, ConfigError> {
        let window = config.schedule.window()?;
        Ok(Self { ctx, config, window, cycles_run: 0 })
    }

    /// Number of cycles invoked so far, skipped ones included.
    #[must_use]
    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    /// Runs one cycle.
    pub async fn run_cycle(&mut self, options: CycleOptions) -> CycleReport {
        self.cycles_run += 1;
        let span = info_span!("cycle", cycle_id = %Uuid::new_v4(), cycle = self.cycles_run);
        self.run_cycle_inner(options).instrument(span).await
    }

    async fn run_cycle_inner(&self, options: CycleOptions) -> CycleReport {
        if !options.ignore_window {
            let local_time = self.ctx.clock.local_time();
            if !self.window.contains(local_time) {
                info!(
                    local_time = %local_time.format("%H:%M"),
                    start = %self.window.start().format("%H:%M"),
                    end = %self.window.end().format("%H:%M"),
                    "outside active window, skipping cycle"
                );
                return CycleReport::Skipped { local_time };
            }
        }

        info!(repositories = self.config.github.repos.len(), "cycle started");
        let mut cycle = Cycle::new(self.ctx, self.config);
        let queue = cycle.fetch_all().await;
        for issue in &queue {
            cycle.process(issue).await;
        }

        let stats = cycle.stats;
        info!(
            eligible = stats.eligible,
            delivered = stats.delivered,
            delivery_failures = stats.delivery_failures,
            deferred = stats.deferred,
            backfilled = stats.backfilled,
            "cycle finished"
        );
        CycleReport::Completed(stats)
    }
}

/// State of one running cycle.
struct Cycle<'a> {
    store: SeenStore<'a>,
    fetcher: IssueFetcher<'a>,
    summarizer: Summarizer<'a>,
    notifier: Notifier<'a>,
    sleeper: &'a dyn Sleeper,
    pacing: &'a PacingConfig,
    repos: &'a [RepositoryHandle],
    stats: CycleStats,
    summaries_enabled: bool,
    webhook_blocked: bool,
    deferred_repos: HashSet<RepositoryHandle>,
}

impl<'a> Cycle<'a> {
    fn new(ctx: &'a ServiceContext, config: &'a Config) -> Self {
        Self {
            store: SeenStore::new(ctx.fs.as_ref(), &config.state.dir),
            fetcher: IssueFetcher::new(ctx.issues.as_ref()),
            summarizer: Summarizer::new(ctx.llm.as_ref(), &config.llm),
            notifier: Notifier::new(ctx.webhook.as_ref(), ctx.clock.as_ref(), &config.webhook),
            sleeper: ctx.sleeper.as_ref(),
            pacing: &config.pacing,
            repos: &config.github.repos,
            stats: CycleStats::default(),
            summaries_enabled: true,
            webhook_blocked: false,
            deferred_repos: HashSet::new(),
        }
    }

    /// FETCH: every repository in order, pausing after each query.
    async fn fetch_all(&mut self) -> Vec<Issue> {
        let mut queue = Vec::new();
        let mut queued = HashSet::new();
        for repo in self.repos {
            self.stats.repositories += 1;
            let span = info_span!("fetch", repo = %repo);
            match self.fetch_repository(repo).instrument(span).await {
                // Seen-sets are loaded before anything is recorded, so a
                // repository listed twice would queue the same issues twice.
                Some(eligible) => queue.extend(
                    eligible
                        .into_iter()
                        .filter(|issue| queued.insert((issue.repository.clone(), issue.number))),
                ),
                None => self.stats.repositories_failed += 1,
            }
            self.sleeper.sleep(self.pacing.repository_delay()).await;
        }
        self.stats.eligible = queue.len();
        queue
    }

    async fn fetch_repository(&mut self, repo: &RepositoryHandle) -> Option<Vec<Issue>> {
        let seen = match self.store.load(repo) {
            Ok(seen) => seen,
            Err(err) => {
                error!(stage = "fetch", error = %err, "cannot load seen-set, skipping repository");
                return None;
            }
        };

        let batch = match self.fetcher.fetch_new(repo, &seen).await {
            Ok(batch) => batch,
            Err(err) => {
                log_remote_failure("fetch", &err, "issue listing failed, skipping repository");
                return None;
            }
        };

        for number in &batch.backfill {
            match self.store.record(repo, *number) {
                Ok(()) => self.stats.backfilled += 1,
                Err(err) => {
                    error!(stage = "backfill", issue = number, error = %err, "cannot record issue");
                }
            }
        }
        if !batch.backfill.is_empty() {
            info!(
                stage = "fetch",
                count = batch.backfill.len(),
                max_known = seen.max_known(),
                "recorded older unseen issues without notifying"
            );
        }
        info!(stage = "fetch", eligible = batch.eligible.len(), "repository fetched");
        Some(batch.eligible)
    }

    /// SUMMARIZE + NOTIFY for one issue.
    async fn process(&mut self, issue: &Issue) {
        if self.webhook_blocked || self.deferred_repos.contains(&issue.repository) {
            self.stats.deferred += 1;
            info!(
                repo = %issue.repository,
                issue = issue.number,
                "deferred to next cycle after an earlier failure"
            );
            return;
        }

        let span = info_span!("issue", repo = %issue.repository, issue = issue.number);
        if !self.process_issue(issue).instrument(span).await {
            // A later number would raise max-known past this one and turn it
            // into backfill next cycle, so the rest of the repository waits.
            self.deferred_repos.insert(issue.repository.clone());
        }
    }

    /// Returns `true` when the issue ended up delivered and recorded.
    async fn process_issue(&mut self, issue: &Issue) -> bool {
        info!(stage = "summarize", title = %issue.title, "processing new issue");
        let summary = self.summary_for(issue).await;
        if let Summary::Unavailable(_) = summary {
            self.stats.summaries_unavailable += 1;
        }

        let payload = self.notifier.prepare(issue, summary.text());
        let delivery = self.notifier.deliver(&payload).await;
        self.sleeper.sleep(self.pacing.delivery_delay()).await;

        if let Err(err) = delivery {
            self.stats.delivery_failures += 1;
            if err.is_authorization() {
                self.webhook_blocked = true;
                error!(
                    stage = "notify",
                    error = %err,
                    "webhook rejected credentials, no more deliveries this cycle"
                );
            } else {
                log_remote_failure("notify", &err, "delivery failed, will retry next cycle");
            }
            return false;
        }

        self.stats.delivered += 1;
        match self.store.record(&issue.repository, issue.number) {
            Ok(()) => {
                info!(stage = "record", "issue delivered and recorded");
                true
            }
            Err(err) => {
                self.stats.record_failures += 1;
                error!(
                    stage = "record",
                    error = %err,
                    "delivered but not recorded, the issue may be sent again"
                );
                false
            }
        }
    }

    async fn summary_for(&mut self, issue: &Issue) -> Summary {
        if !self.summaries_enabled {
            return Summary::Unavailable(RemoteError::Authorization(
                "summaries disabled for this cycle".to_string(),
            ));
        }

        let summary = self.summarizer.summarize(&issue.title, &issue.body).await;
        self.sleeper.sleep(self.pacing.summary_delay()).await;
        if summary.is_authorization_failure() {
            self.summaries_enabled = false;
            error!(
                stage = "summarize",
                "generation backend rejected credentials, using placeholders for the rest of the cycle"
            );
        }
        summary
    }
}

fn log_remote_failure(stage: &'static str, err: &RemoteError, message: &str) {
    match err {
        RemoteError::Authorization(_) => error!(stage, error = %err, "{message}"),
        RemoteError::Transient(_) | RemoteError::MalformedResponse(_) => {
            warn!(stage, error = %err, "{message}");
        }
    }
}

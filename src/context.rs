//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::adapters::live::{
    FeishuWebhook, GithubIssueSource, LiveClock, LiveFileSystem, OpenAiLlmClient, TokioSleeper,
};
use crate::adapters::replaying::{
    InstantSleeper, ReplayingClock, ReplayingIssueSource, ReplayingLlmClient, ReplayingWebhook,
    SharedReplayer,
};
use crate::cassette::format::Cassette;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::Config;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::issues::IssueSource;
use crate::ports::llm::LlmClient;
use crate::ports::sleeper::Sleeper;
use crate::ports::webhook::ChatWebhook;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations (live, replaying).
pub struct ServiceContext {
    /// Clock for obtaining the current time.
    pub clock: Box<dyn Clock>,
    /// Pacing between remote calls.
    pub sleeper: Box<dyn Sleeper>,
    /// Filesystem holding the seen-sets.
    pub fs: Box<dyn FileSystem>,
    /// Source of open issues.
    pub issues: Box<dyn IssueSource>,
    /// Generation backend for summaries.
    pub llm: Box<dyn LlmClient>,
    /// Chat webhook receiving notification cards.
    pub webhook: Box<dyn ChatWebhook>,
}

impl ServiceContext {
    /// Creates a live context talking to the configured services.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the HTTP clients cannot be built.
    pub fn live(config: &Config) -> Result<Self, String> {
        let timeout = config.http.timeout();
        Ok(Self {
            clock: Box::new(LiveClock),
            sleeper: Box::new(TokioSleeper),
            fs: Box::new(LiveFileSystem),
            issues: Box::new(GithubIssueSource::new(&config.github, timeout)?),
            llm: Box::new(OpenAiLlmClient::new(&config.llm, timeout)?),
            webhook: Box::new(FeishuWebhook::new(&config.webhook.url, timeout)?),
        })
    }

    /// Creates a replaying context from a cassette file.
    ///
    /// Remote ports and the clock are served from the cassette, the
    /// filesystem is the real disk and pauses return immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = Cassette::load(path)?;
        Ok(Self::from_replayer(&Arc::new(Mutex::new(CassetteReplayer::new(&cassette)))))
    }

    /// Creates a replaying context around an existing replayer, so the
    /// caller can check it for unconsumed interactions afterwards.
    #[must_use]
    pub fn from_replayer(replayer: &SharedReplayer) -> Self {
        Self {
            clock: Box::new(ReplayingClock::new(Arc::clone(replayer))),
            sleeper: Box::new(InstantSleeper::default()),
            fs: Box::new(LiveFileSystem),
            issues: Box::new(ReplayingIssueSource::new(Arc::clone(replayer))),
            llm: Box::new(ReplayingLlmClient::new(Arc::clone(replayer))),
            webhook: Box::new(ReplayingWebhook::new(Arc::clone(replayer))),
        }
    }
}

//! Configuration loading and validation.
//!
//! Hierarchical configuration using figment:
//! 1. Programmatic defaults
//! 2. YAML file (`config.yaml` unless a path is given)
//! 3. Environment variables (`HERALD_` prefix, `__` separates sections,
//!    e.g. `HERALD_WEBHOOK__SECRET`)

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogConfig;
use crate::pipeline::window::ActiveWindow;
use crate::ports::RepositoryHandle;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration error types. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file or environment could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(String),

    /// `github.repos` is empty.
    #[error("no repositories configured under github.repos")]
    NoRepositories,

    /// The same repository appears more than once in `github.repos`.
    #[error("repository {0} is listed more than once under github.repos")]
    DuplicateRepository(String),

    /// A required setting is blank.
    #[error("{0} cannot be empty")]
    MissingField(&'static str),

    /// A window bound is not a time of day.
    #[error("invalid {field}: {value:?}, expected HH:MM")]
    InvalidTime {
        /// Offending setting.
        field: &'static str,
        /// Value as written.
        value: String,
    },

    /// `schedule.interval_minutes` is zero.
    #[error("invalid schedule.interval_minutes: {0}, must be at least 1")]
    InvalidInterval(u64),

    /// `llm.max_tokens` is zero.
    #[error("invalid llm.max_tokens: {0}, must be at least 1")]
    InvalidMaxTokens(u32),

    /// `logging.level` is not a known level.
    #[error("invalid log level: {0}, must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Root configuration value, passed down explicitly to every component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Issue source settings.
    #[serde(default)]
    pub github: GithubConfig,
    /// Generation backend settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Chat webhook settings.
    #[serde(default)]
    pub webhook: WebhookConfig,
    /// Active hours and poll interval.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Delays between remote calls.
    #[serde(default)]
    pub pacing: PacingConfig,
    /// Where seen-sets are persisted.
    #[serde(default)]
    pub state: StateConfig,
    /// Outbound HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,
    /// Log sink settings.
    #[serde(default)]
    pub logging: LogConfig,
}

/// Issue source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Personal access token; optional for public repositories.
    #[serde(default)]
    pub token: Option<String>,
    /// REST API root.
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
    /// Repositories to poll, in order.
    #[serde(default)]
    pub repos: Vec<RepositoryHandle>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self { token: None, api_base: default_github_api_base(), repos: Vec::new() }
    }
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

/// Generation backend settings (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Bearer key for the backend.
    #[serde(default)]
    pub api_key: String,
    /// API root, e.g. `https://api.openai.com/v1`.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Model identifier.
    #[serde(default)]
    pub model: String,
    /// Upper bound on generated tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Presence penalty.
    #[serde(default = "default_presence_penalty")]
    pub presence_penalty: f32,
    /// Issue bodies longer than this are cut before prompting.
    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_llm_base_url(),
            model: String::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            presence_penalty: default_presence_penalty(),
            max_body_chars: default_max_body_chars(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

const fn default_max_tokens() -> u32 {
    256
}

const fn default_temperature() -> f32 {
    0.4
}

const fn default_top_p() -> f32 {
    0.8
}

const fn default_presence_penalty() -> f32 {
    1.2
}

const fn default_max_body_chars() -> usize {
    4000
}

/// Chat webhook settings (Feishu/Lark custom robot with signing enabled).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Robot webhook URL.
    #[serde(default)]
    pub url: String,
    /// Signing secret shown in the robot's security settings.
    #[serde(default)]
    pub secret: String,
    /// Card template id.
    #[serde(default)]
    pub template_id: String,
    /// Card template version.
    #[serde(default)]
    pub template_version_name: String,
}

/// Active hours and poll interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Start of the active window, `HH:MM`, inclusive.
    #[serde(default = "default_start_time")]
    pub start_time: String,
    /// End of the active window, `HH:MM`, exclusive.
    #[serde(default = "default_end_time")]
    pub end_time: String,
    /// Minutes between cycle invocations.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start_time: default_start_time(),
            end_time: default_end_time(),
            interval_minutes: default_interval_minutes(),
        }
    }
}

impl ScheduleConfig {
    /// Parses the configured window.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTime`] when either bound is not `HH:MM`.
    pub fn window(&self) -> Result<ActiveWindow, ConfigError> {
        let start = ActiveWindow::parse_time(&self.start_time).ok_or_else(|| {
            ConfigError::InvalidTime { field: "schedule.start_time", value: self.start_time.clone() }
        })?;
        let end = ActiveWindow::parse_time(&self.end_time).ok_or_else(|| {
            ConfigError::InvalidTime { field: "schedule.end_time", value: self.end_time.clone() }
        })?;
        Ok(ActiveWindow::new(start, end))
    }

    /// Interval between cycles.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }
}

fn default_start_time() -> String {
    "09:00".to_string()
}

fn default_end_time() -> String {
    "21:00".to_string()
}

const fn default_interval_minutes() -> u64 {
    60
}

/// Delays between remote calls, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Pause after each repository listing.
    #[serde(default = "default_repository_delay")]
    pub repository_delay_secs: u64,
    /// Pause after each summary request.
    #[serde(default = "default_summary_delay")]
    pub summary_delay_secs: u64,
    /// Pause after each webhook delivery.
    #[serde(default = "default_delivery_delay")]
    pub delivery_delay_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            repository_delay_secs: default_repository_delay(),
            summary_delay_secs: default_summary_delay(),
            delivery_delay_secs: default_delivery_delay(),
        }
    }
}

impl PacingConfig {
    /// Pause after each repository listing.
    #[must_use]
    pub fn repository_delay(&self) -> Duration {
        Duration::from_secs(self.repository_delay_secs)
    }

    /// Pause after each summary request.
    #[must_use]
    pub fn summary_delay(&self) -> Duration {
        Duration::from_secs(self.summary_delay_secs)
    }

    /// Pause after each webhook delivery.
    #[must_use]
    pub fn delivery_delay(&self) -> Duration {
        Duration::from_secs(self.delivery_delay_secs)
    }
}

const fn default_repository_delay() -> u64 {
    6
}

const fn default_summary_delay() -> u64 {
    10
}

const fn default_delivery_delay() -> u64 {
    60
}

/// Where seen-sets are persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Directory holding one `<owner>_<name>.txt` file per repository.
    #[serde(default = "default_state_dir")]
    pub dir: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self { dir: default_state_dir() }
    }
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".herald/seen")
}

/// Outbound HTTP settings shared by the live adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: default_timeout_secs() }
    }
}

impl HttpConfig {
    /// Per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

const fn default_timeout_secs() -> u64 {
    30
}

/// Configuration loader with hierarchical merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads defaults, then `path` (or [`DEFAULT_CONFIG_PATH`]), then
    /// `HERALD_*` environment variables, and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if the file does not exist.
    /// Returns an error if extraction or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        if !path.is_file() {
            return Err(ConfigError::Load(format!(
                "configuration file {} not found",
                path.display()
            )));
        }
        Self::extract(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed("HERALD_").split("__")),
        )
    }

    /// Loads configuration from YAML text only, without the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn from_yaml_str(yaml: &str) -> Result<Config, ConfigError> {
        Self::extract(
            Figment::new().merge(Serialized::defaults(Config::default())).merge(Yaml::string(yaml)),
        )
    }

    fn extract(figment: Figment) -> Result<Config, ConfigError> {
        let config: Config = figment.extract().map_err(|e| ConfigError::Load(e.to_string()))?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validates configuration after loading.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.github.repos.is_empty() {
            return Err(ConfigError::NoRepositories);
        }
        let mut listed = HashSet::new();
        for repo in &config.github.repos {
            if !listed.insert(repo) {
                return Err(ConfigError::DuplicateRepository(repo.to_string()));
            }
        }
        if config.github.api_base.trim().is_empty() {
            return Err(ConfigError::MissingField("github.api_base"));
        }

        if config.llm.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.base_url"));
        }
        if config.llm.model.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.model"));
        }
        if config.llm.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(config.llm.max_tokens));
        }

        if config.webhook.url.trim().is_empty() {
            return Err(ConfigError::MissingField("webhook.url"));
        }
        if config.webhook.secret.is_empty() {
            return Err(ConfigError::MissingField("webhook.secret"));
        }
        if config.webhook.template_id.trim().is_empty() {
            return Err(ConfigError::MissingField("webhook.template_id"));
        }

        config.schedule.window()?;
        if config.schedule.interval_minutes == 0 {
            return Err(ConfigError::InvalidInterval(config.schedule.interval_minutes));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}

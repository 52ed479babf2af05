//! Summarizer: condenses one issue into a short blurb via the LLM port.

use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::error::{truncate, RemoteError};
use crate::ports::{CompletionRequest, LlmClient};

/// Text shown on the card when no summary could be produced.
pub const SUMMARY_PLACEHOLDER: &str = "(summary unavailable, see the issue link)";

/// Outcome of a summary request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    /// The backend produced a summary.
    Generated(String),
    /// The backend failed; the card carries [`SUMMARY_PLACEHOLDER`].
    Unavailable(RemoteError),
}

impl Summary {
    /// Text to put on the card.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Generated(text) => text,
            Self::Unavailable(_) => SUMMARY_PLACEHOLDER,
        }
    }

    /// Returns `true` when the backend rejected our credentials.
    #[must_use]
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, Self::Unavailable(err) if err.is_authorization())
    }
}

/// Builds the fixed instruction prompt for one issue.
///
/// Bodies longer than `max_body_chars` are cut to keep the request bounded.
#[must_use]
pub fn build_prompt(title: &str, body: &str, max_body_chars: usize) -> String {
    let body = truncate(body.trim(), max_body_chars);
    format!(
        "The following is the title and content of an issue a developer opened on GitHub. \
         Summarize it in 100-200 characters.\ntitle: {title}\ncontent: {body}\n"
    )
}

/// Sends one synchronous, non-streaming summary request per issue.
pub struct Summarizer<'a> {
    llm: &'a dyn LlmClient,
    config: &'a LlmConfig,
}

impl<'a> Summarizer<'a> {
    /// Creates a summarizer using the given client and model settings.
    #[must_use]
    pub fn new(llm: &'a dyn LlmClient, config: &'a LlmConfig) -> Self {
        Self { llm, config }
    }

    /// Builds the completion request for an issue.
    #[must_use]
    pub fn request_for(&self, title: &str, body: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model.clone(),
            prompt: build_prompt(title, body, self.config.max_body_chars),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            presence_penalty: self.config.presence_penalty,
        }
    }

    /// Summarizes an issue. Never fails: backend errors are logged and turned
    /// into [`Summary::Unavailable`] so the notification still goes out.
    pub async fn summarize(&self, title: &str, body: &str) -> Summary {
        let request = self.request_for(title, body);
        match self.llm.complete(&request).await {
            Ok(response) => {
                let text = response.text.trim();
                if text.is_empty() {
                    warn!(stage = "summarize", "generation backend returned an empty summary");
                    Summary::Unavailable(RemoteError::MalformedResponse(
                        "empty completion".to_string(),
                    ))
                } else {
                    debug!(stage = "summarize", chars = text.chars().count(), "summary generated");
                    Summary::Generated(text.to_string())
                }
            }
            Err(err) => {
                warn!(stage = "summarize", error = %err, "summary unavailable");
                Summary::Unavailable(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{CompletionResponse, LlmFuture};
    use std::sync::Mutex;

    struct ScriptedLlm {
        replies: Mutex<Vec<Result<CompletionResponse, RemoteError>>>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<Result<CompletionResponse, RemoteError>>) -> Self {
            Self { replies: Mutex::new(replies), seen: Mutex::new(Vec::new()) }
        }
    }

    impl LlmClient for ScriptedLlm {
        fn complete(&self, request: &CompletionRequest) -> LlmFuture<'_> {
            self.seen.lock().unwrap().push(request.clone());
            let reply = self.replies.lock().unwrap().remove(0);
            Box::pin(async move { reply })
        }
    }

    fn llm_config() -> LlmConfig {
        LlmConfig { model: "gpt-test".into(), max_body_chars: 20, ..LlmConfig::default() }
    }

    #[tokio::test]
    async fn returns_trimmed_generated_text() {
        let llm = ScriptedLlm::new(vec![Ok(CompletionResponse { text: "  Crash on start.\n".into() })]);
        let config = llm_config();

        let summary = Summarizer::new(&llm, &config).summarize("Crash", "It crashes").await;

        assert_eq!(summary, Summary::Generated("Crash on start.".into()));
        let request = llm.seen.lock().unwrap()[0].clone();
        assert_eq!(request.model, "gpt-test");
        assert_eq!(request.max_tokens, 256);
        assert!(request.prompt.contains("100-200 characters"));
        assert!(request.prompt.contains("title: Crash"));
    }

    #[tokio::test]
    async fn backend_failure_becomes_placeholder() {
        let llm = ScriptedLlm::new(vec![Err(RemoteError::Transient("timeout".into()))]);
        let config = llm_config();

        let summary = Summarizer::new(&llm, &config).summarize("t", "b").await;

        assert_eq!(summary.text(), SUMMARY_PLACEHOLDER);
        assert!(!summary.is_authorization_failure());
    }

    #[tokio::test]
    async fn empty_completion_is_unavailable() {
        let llm = ScriptedLlm::new(vec![Ok(CompletionResponse { text: "   ".into() })]);
        let config = llm_config();

        let summary = Summarizer::new(&llm, &config).summarize("t", "b").await;

        assert!(matches!(summary, Summary::Unavailable(RemoteError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn authorization_failure_is_flagged() {
        let llm = ScriptedLlm::new(vec![Err(RemoteError::Authorization("bad key".into()))]);
        let config = llm_config();

        let summary = Summarizer::new(&llm, &config).summarize("t", "b").await;

        assert!(summary.is_authorization_failure());
    }

    #[test]
    fn prompt_truncates_long_bodies() {
        let prompt = build_prompt("Title", &"x".repeat(100), 10);
        assert!(prompt.contains(&format!("content: {}...", "x".repeat(10))));
        assert!(!prompt.contains(&"x".repeat(11)));
    }
}

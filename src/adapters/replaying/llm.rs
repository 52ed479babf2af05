//! Replaying adapter for the `LlmClient` port.

use serde_json::json;

use super::{lock, SharedReplayer};
use crate::ports::llm::{CompletionRequest, LlmClient, LlmFuture};

/// Serves recorded LLM completions from a cassette.
///
/// Recorded inputs are matched against `{"model": ..}` so prompts can change
/// without re-recording.
pub struct ReplayingLlmClient {
    replayer: SharedReplayer,
}

impl ReplayingLlmClient {
    /// Create a replaying LLM client backed by the given replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl LlmClient for ReplayingLlmClient {
    fn complete(&self, request: &CompletionRequest) -> LlmFuture<'_> {
        let result =
            lock(&self.replayer).next_result("llm", "complete", &json!({ "model": request.model }));
        Box::pin(async move { result })
    }
}

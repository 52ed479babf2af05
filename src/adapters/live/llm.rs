//! Live adapter for the `LlmClient` port using an OpenAI-compatible
//! chat-completions endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::transport_error;
use crate::config::LlmConfig;
use crate::error::{truncate, RemoteError};
use crate::ports::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmFuture};

/// Live client posting to `{base_url}/chat/completions`.
pub struct OpenAiLlmClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiLlmClient {
    /// Creates a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig, timeout: Duration) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build LLM client: {e}"))?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }
}

/// Request body sent to the chat-completions API.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    presence_penalty: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error envelope returned by OpenAI-compatible backends.
#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl LlmClient for OpenAiLlmClient {
    fn complete(&self, request: &CompletionRequest) -> LlmFuture<'_> {
        let request = request.clone();

        Box::pin(async move {
            let body = ChatRequest {
                model: &request.model,
                messages: vec![ChatMessage { role: "user", content: &request.prompt }],
                max_tokens: request.max_tokens,
                temperature: request.temperature,
                top_p: request.top_p,
                presence_penalty: request.presence_penalty,
                stream: false,
            };

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| transport_error("LLM request failed", &e))?;

            let status = response.status();
            let response_text = response
                .text()
                .await
                .map_err(|e| transport_error("Failed to read LLM response", &e))?;

            if !status.is_success() {
                let msg = serde_json::from_str::<ApiError>(&response_text)
                    .map(|e| e.error.message)
                    .unwrap_or(response_text);
                return Err(RemoteError::from_status(status.as_u16(), &msg));
            }

            let api_response: ChatResponse =
                serde_json::from_str(&response_text).map_err(|e| {
                    RemoteError::MalformedResponse(format!(
                        "unexpected completion body ({e}): {}",
                        truncate(&response_text, 200)
                    ))
                })?;

            let text = api_response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| {
                    RemoteError::MalformedResponse("completion has no choices".to_string())
                })?;

            Ok(CompletionResponse { text })
        })
    }
}

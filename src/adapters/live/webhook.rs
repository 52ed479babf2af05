//! Live adapter for the `ChatWebhook` port posting to a Feishu/Lark custom
//! robot URL.

use std::time::Duration;

use reqwest::Client;

use super::transport_error;
use crate::error::{truncate, RemoteError};
use crate::ports::webhook::{ChatWebhook, WebhookFuture, WebhookReply};

/// Posts JSON envelopes to a single robot URL.
pub struct FeishuWebhook {
    client: Client,
    url: String,
}

impl FeishuWebhook {
    /// Creates a webhook client for `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build webhook client: {e}"))?;
        Ok(Self { client, url: url.to_string() })
    }
}

impl ChatWebhook for FeishuWebhook {
    fn post(&self, envelope: &serde_json::Value) -> WebhookFuture<'_> {
        let envelope = envelope.clone();

        Box::pin(async move {
            let response = self
                .client
                .post(&self.url)
                .json(&envelope)
                .send()
                .await
                .map_err(|e| transport_error("Webhook request failed", &e))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| transport_error("Failed to read webhook response", &e))?;

            if !status.is_success() {
                return Err(RemoteError::from_status(status.as_u16(), &text));
            }

            serde_json::from_str::<WebhookReply>(&text).map_err(|e| {
                RemoteError::MalformedResponse(format!(
                    "unexpected webhook reply ({e}): {}",
                    truncate(&text, 200)
                ))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn posts_envelope_and_parses_reply() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/open-apis/bot/v2/hook/abc")
                    .json_body_includes(r#"{"msg_type":"interactive"}"#);
                then.status(200).json_body(json!({ "code": 0, "msg": "success", "data": {} }));
            })
            .await;
        let webhook =
            FeishuWebhook::new(&server.url("/open-apis/bot/v2/hook/abc"), Duration::from_secs(5))
                .unwrap();

        let reply = webhook.post(&json!({ "msg_type": "interactive" })).await.unwrap();

        mock.assert_async().await;
        assert!(reply.is_success());
    }

    #[tokio::test]
    async fn rejection_in_body_is_returned_as_reply() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/hook");
                then.status(200).json_body(json!({ "code": 19021, "msg": "sign match fail" }));
            })
            .await;
        let webhook = FeishuWebhook::new(&server.url("/hook"), Duration::from_secs(5)).unwrap();

        let reply = webhook.post(&json!({})).await.unwrap();

        assert!(!reply.is_success());
        assert_eq!(reply.effective_code(), Some(19021));
    }

    #[tokio::test]
    async fn non_json_reply_is_malformed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/hook");
                then.status(200).body("<html>ok</html>");
            })
            .await;
        let webhook = FeishuWebhook::new(&server.url("/hook"), Duration::from_secs(5)).unwrap();

        let err = webhook.post(&json!({})).await.unwrap_err();
        assert!(matches!(err, RemoteError::MalformedResponse(_)), "{err:?}");
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/hook");
                then.status(503).body("unavailable");
            })
            .await;
        let webhook = FeishuWebhook::new(&server.url("/hook"), Duration::from_secs(5)).unwrap();

        let err = webhook.post(&json!({})).await.unwrap_err();
        assert!(matches!(err, RemoteError::Transient(_)), "{err:?}");
    }
}

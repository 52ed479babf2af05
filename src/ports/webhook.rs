//! Chat webhook port for delivering notification cards.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// Boxed future type alias used by [`ChatWebhook`].
pub type WebhookFuture<'a> =
    Pin<Box<dyn Future<Output = Result<WebhookReply, RemoteError>> + Send + 'a>>;

/// Application-level acknowledgement returned by the chat platform.
///
/// The platform answers HTTP 200 even for rejected messages; the status
/// lives in these fields. Newer endpoints use `code`/`msg`, older ones
/// `StatusCode`/`StatusMessage`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookReply {
    /// Status code, `0` on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    /// Status message, `"success"` on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    /// Legacy status code.
    #[serde(default, rename = "StatusCode", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i64>,
    /// Legacy status message.
    #[serde(default, rename = "StatusMessage", skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

impl WebhookReply {
    /// Returns `true` only when the platform explicitly acknowledged the message.
    #[must_use]
    pub fn is_success(&self) -> bool {
        let code = self.code.or(self.status_code);
        let msg = self.msg.as_deref().or(self.status_message.as_deref());
        match (code, msg) {
            (Some(code), Some(msg)) => code == 0 && msg == "success",
            (Some(code), None) => code == 0,
            (None, Some(msg)) => msg == "success",
            (None, None) => false,
        }
    }

    /// Effective status code, whichever field carried it.
    #[must_use]
    pub fn effective_code(&self) -> Option<i64> {
        self.code.or(self.status_code)
    }

    /// Effective status message, whichever field carried it.
    #[must_use]
    pub fn effective_msg(&self) -> &str {
        self.msg.as_deref().or(self.status_message.as_deref()).unwrap_or("")
    }
}

/// Posts JSON envelopes to a chat webhook.
pub trait ChatWebhook: Send + Sync {
    /// Sends `envelope` and returns the platform's acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or a reply
    /// body that is not a JSON acknowledgement.
    fn post(&self, envelope: &serde_json::Value) -> WebhookFuture<'_>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_explicit_status() {
        let reply: WebhookReply = serde_json::from_str(r#"{"code":0,"msg":"success"}"#).unwrap();
        assert!(reply.is_success());

        let empty: WebhookReply = serde_json::from_str("{}").unwrap();
        assert!(!empty.is_success());
    }

    #[test]
    fn legacy_fields_are_honoured() {
        let reply: WebhookReply =
            serde_json::from_str(r#"{"StatusCode":0,"StatusMessage":"success"}"#).unwrap();
        assert!(reply.is_success());
    }

    #[test]
    fn rejected_signature_is_not_success() {
        let reply: WebhookReply =
            serde_json::from_str(r#"{"code":19021,"msg":"sign match fail or timestamp is not within one hour from current time"}"#)
                .unwrap();
        assert!(!reply.is_success());
        assert_eq!(reply.effective_code(), Some(19021));
    }
}

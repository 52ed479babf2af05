//! Notifier: renders the signed card envelope and delivers it.

use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::config::WebhookConfig;
use crate::error::RemoteError;
use crate::pipeline::sign::sign;
use crate::ports::{ChatWebhook, Clock, Issue, RepositoryHandle, WebhookReply};

/// Platform codes meaning the signature or caller was rejected.
const SIGNATURE_REJECTED_CODES: [i64; 2] = [19021, 19022];

/// Everything one card needs, stamped and signed for a single send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationPayload {
    /// Repository the issue belongs to.
    pub repository: RepositoryHandle,
    /// Issue number.
    pub issue_number: u64,
    /// Issue title.
    pub title: String,
    /// Generated summary or placeholder.
    pub summary: String,
    /// Browser URL of the issue.
    pub url: String,
    /// Unix seconds at preparation time.
    pub timestamp: i64,
    /// Signature over `timestamp` and the shared secret.
    pub signature: String,
}

/// Delivers notification cards to the chat webhook.
pub struct Notifier<'a> {
    webhook: &'a dyn ChatWebhook,
    clock: &'a dyn Clock,
    config: &'a WebhookConfig,
}

impl<'a> Notifier<'a> {
    /// Creates a notifier for the configured robot.
    #[must_use]
    pub fn new(webhook: &'a dyn ChatWebhook, clock: &'a dyn Clock, config: &'a WebhookConfig) -> Self {
        Self { webhook, clock, config }
    }

    /// Stamps a fresh timestamp and signature for `issue`.
    ///
    /// Call this right before [`Notifier::deliver`]; payloads are not meant
    /// to be kept around because the platform rejects stale signatures.
    #[must_use]
    pub fn prepare(&self, issue: &Issue, summary: &str) -> NotificationPayload {
        let timestamp = self.clock.now().timestamp();
        NotificationPayload {
            repository: issue.repository.clone(),
            issue_number: issue.number,
            title: issue.title.clone(),
            summary: summary.to_string(),
            url: issue.url.clone(),
            timestamp,
            signature: sign(timestamp, &self.config.secret),
        }
    }

    /// Renders the templated interactive card envelope.
    #[must_use]
    pub fn envelope(&self, payload: &NotificationPayload) -> serde_json::Value {
        json!({
            "timestamp": payload.timestamp.to_string(),
            "sign": payload.signature,
            "msg_type": "interactive",
            "card": {
                "type": "template",
                "data": {
                    "template_id": self.config.template_id,
                    "template_version_name": self.config.template_version_name,
                    "template_variable": {
                        "repo": payload.repository.as_str(),
                        "issues_id": payload.issue_number,
                        "issues": payload.title,
                        "content": payload.summary,
                        "issues_url": payload.url,
                    }
                }
            }
        })
    }

    /// Sends one card. Succeeds only when the platform acknowledges it.
    ///
    /// # Errors
    ///
    /// Returns the transport error, or an error built from the platform's
    /// status when the reply is not an explicit success. Signature
    /// rejections are authorization errors.
    pub async fn deliver(&self, payload: &NotificationPayload) -> Result<(), RemoteError> {
        let envelope = self.envelope(payload);
        let reply = self.webhook.post(&envelope).await?;
        if reply.is_success() {
            debug!(stage = "notify", "webhook acknowledged card");
            return Ok(());
        }
        Err(rejection(&reply))
    }
}

fn rejection(reply: &WebhookReply) -> RemoteError {
    let code = reply.effective_code();
    let message = format!(
        "webhook rejected card (code {}): {}",
        code.map_or_else(|| "none".to_string(), |c| c.to_string()),
        reply.effective_msg()
    );
    match code {
        Some(code) if SIGNATURE_REJECTED_CODES.contains(&code) => RemoteError::Authorization(message),
        _ => RemoteError::Transient(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{IssueState, WebhookFuture};
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Mutex;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    struct ScriptedWebhook {
        reply: Result<WebhookReply, RemoteError>,
        posted: Mutex<Vec<serde_json::Value>>,
    }

    impl ChatWebhook for ScriptedWebhook {
        fn post(&self, envelope: &serde_json::Value) -> WebhookFuture<'_> {
            self.posted.lock().unwrap().push(envelope.clone());
            let reply = self.reply.clone();
            Box::pin(async move { reply })
        }
    }

    fn webhook_config() -> WebhookConfig {
        WebhookConfig {
            url: "https://example.invalid/hook".into(),
            secret: "s3cret".into(),
            template_id: "tpl-1".into(),
            template_version_name: "1.0.2".into(),
        }
    }

    fn sample_issue() -> Issue {
        Issue {
            repository: "octo/cat".parse().unwrap(),
            number: 45,
            title: "Crash on start".into(),
            body: "trace".into(),
            url: "https://github.com/octo/cat/issues/45".into(),
            state: IssueState::Open,
        }
    }

    fn reply(code: i64, msg: &str) -> WebhookReply {
        WebhookReply { code: Some(code), msg: Some(msg.into()), ..WebhookReply::default() }
    }

    #[test]
    fn prepare_signs_fresh_timestamp() {
        let clock = FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let hook = ScriptedWebhook { reply: Ok(reply(0, "success")), posted: Mutex::new(vec![]) };
        let config = webhook_config();
        let notifier = Notifier::new(&hook, &clock, &config);

        let payload = notifier.prepare(&sample_issue(), "short summary");

        assert_eq!(payload.timestamp, 1_700_000_000);
        assert_eq!(payload.signature, "IX3eHI0/v/Td7jqJ0ynSEK3Dq5JY3HUZeoeMgVZeZGo=");
        assert_eq!(payload.issue_number, 45);
        assert_eq!(payload.summary, "short summary");
    }

    #[tokio::test]
    async fn deliver_posts_template_card() {
        let clock = FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let hook = ScriptedWebhook { reply: Ok(reply(0, "success")), posted: Mutex::new(vec![]) };
        let config = webhook_config();
        let notifier = Notifier::new(&hook, &clock, &config);

        let payload = notifier.prepare(&sample_issue(), "summary");
        notifier.deliver(&payload).await.unwrap();

        let posted = hook.posted.lock().unwrap()[0].clone();
        assert_eq!(posted["msg_type"], "interactive");
        assert_eq!(posted["timestamp"], "1700000000");
        assert_eq!(posted["sign"], payload.signature);
        let data = &posted["card"]["data"];
        assert_eq!(data["template_id"], "tpl-1");
        assert_eq!(data["template_version_name"], "1.0.2");
        assert_eq!(data["template_variable"]["repo"], "octo/cat");
        assert_eq!(data["template_variable"]["issues_id"], 45);
        assert_eq!(data["template_variable"]["issues"], "Crash on start");
        assert_eq!(data["template_variable"]["content"], "summary");
        assert_eq!(data["template_variable"]["issues_url"], "https://github.com/octo/cat/issues/45");
    }

    #[tokio::test]
    async fn non_success_status_is_a_failed_delivery() {
        let clock = FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let hook =
            ScriptedWebhook { reply: Ok(reply(9499, "Bad Request")), posted: Mutex::new(vec![]) };
        let config = webhook_config();
        let notifier = Notifier::new(&hook, &clock, &config);

        let err = notifier.deliver(&notifier.prepare(&sample_issue(), "s")).await.unwrap_err();

        assert!(matches!(err, RemoteError::Transient(_)));
        assert!(err.to_string().contains("9499"));
    }

    #[tokio::test]
    async fn signature_rejection_is_authorization() {
        let clock = FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let hook = ScriptedWebhook {
            reply: Ok(reply(19021, "sign match fail")),
            posted: Mutex::new(vec![]),
        };
        let config = webhook_config();
        let notifier = Notifier::new(&hook, &clock, &config);

        let err = notifier.deliver(&notifier.prepare(&sample_issue(), "s")).await.unwrap_err();

        assert!(err.is_authorization());
    }

    #[tokio::test]
    async fn transport_error_is_passed_through() {
        let clock = FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let hook = ScriptedWebhook {
            reply: Err(RemoteError::Transient("connection reset".into())),
            posted: Mutex::new(vec![]),
        };
        let config = webhook_config();
        let notifier = Notifier::new(&hook, &clock, &config);

        let err = notifier.deliver(&notifier.prepare(&sample_issue(), "s")).await.unwrap_err();

        assert_eq!(err, RemoteError::Transient("connection reset".into()));
    }
}

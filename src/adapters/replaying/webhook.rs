//! Replaying adapter for the `ChatWebhook` port.

use serde_json::{json, Value};

use super::{lock, SharedReplayer};
use crate::ports::webhook::{ChatWebhook, WebhookFuture};

/// Serves recorded webhook replies from a cassette.
///
/// Recorded inputs are matched against the card variables
/// `{"repo": .., "issues_id": ..}`, which identify the delivery.
pub struct ReplayingWebhook {
    replayer: SharedReplayer,
}

impl ReplayingWebhook {
    /// Create a replaying webhook backed by the given replayer.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

fn delivery_key(envelope: &Value) -> Value {
    let vars = &envelope["card"]["data"]["template_variable"];
    json!({ "repo": vars["repo"], "issues_id": vars["issues_id"] })
}

impl ChatWebhook for ReplayingWebhook {
    fn post(&self, envelope: &Value) -> WebhookFuture<'_> {
        let result = lock(&self.replayer).next_result("webhook", "post", &delivery_key(envelope));
        Box::pin(async move { result })
    }
}

//! Replaying adapters that serve recorded interactions from a cassette.
//!
//! All adapters built from one cassette share a single
//! [`CassetteReplayer`], so the cassette can be checked for leftovers
//! once a test is done.

pub mod clock;
pub mod issues;
pub mod llm;
pub mod sleeper;
pub mod webhook;

pub use clock::ReplayingClock;
pub use issues::ReplayingIssueSource;
pub use llm::ReplayingLlmClient;
pub use sleeper::InstantSleeper;
pub use webhook::ReplayingWebhook;

use std::sync::{Arc, Mutex, MutexGuard};

use crate::cassette::replayer::CassetteReplayer;

/// Shared handle to a replayer.
pub type SharedReplayer = Arc<Mutex<CassetteReplayer>>;

/// Locks the shared replayer.
///
/// # Panics
///
/// Panics if a previous replay panicked while holding the lock.
pub(crate) fn lock(replayer: &SharedReplayer) -> MutexGuard<'_, CassetteReplayer> {
    replayer.lock().expect("replayer lock poisoned")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use chrono::Utc;
    use serde_json::Value;

    pub(crate) fn shared(interactions: Vec<(&str, &str, Value, Value)>) -> SharedReplayer {
        let cassette = Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            interactions: interactions
                .into_iter()
                .enumerate()
                .map(|(seq, (port, method, input, output))| Interaction {
                    seq: seq as u64,
                    port: port.into(),
                    method: method.into(),
                    input,
                    output,
                })
                .collect(),
        };
        Arc::new(Mutex::new(CassetteReplayer::new(&cassette)))
    }
}

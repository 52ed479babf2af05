//! Serves a cassette's interactions back to the replaying adapters.

use std::collections::{HashMap, VecDeque};

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::format::{Cassette, Interaction};
use crate::error::RemoteError;

/// Hands out recorded interactions one `port::method` stream at a time.
///
/// Streams are independent: the order between, say, `llm::complete` and
/// `webhook::post` does not matter, only the order within each stream.
pub struct CassetteReplayer {
    streams: HashMap<(String, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Splits `cassette` into per `port::method` streams.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut streams: HashMap<(String, String), VecDeque<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            streams
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction.clone());
        }
        Self { streams }
    }

    /// Returns `true` once every recorded interaction has been served.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.streams.values().all(VecDeque::is_empty)
    }

    /// Pops the next interaction of `port::method`.
    ///
    /// A recorded `input` of `null` matches anything; otherwise it must equal
    /// `input`.
    ///
    /// # Panics
    ///
    /// Panics if the stream is missing or exhausted, or if the recorded input
    /// differs from `input`.
    pub fn next_interaction(&mut self, port: &str, method: &str, input: &Value) -> Interaction {
        let key = (port.to_string(), method.to_string());
        let Some(stream) = self.streams.get_mut(&key) else {
            let mut known: Vec<String> =
                self.streams.keys().map(|(p, m)| format!("{p}::{m}")).collect();
            known.sort();
            panic!("no interactions recorded for {port}::{method}; cassette has [{}]", known.join(", "));
        };
        let Some(interaction) = stream.pop_front() else {
            panic!("cassette ran out of {port}::{method} interactions");
        };
        assert!(
            interaction.input.is_null() || interaction.input == *input,
            "cassette mismatch at seq={} {port}::{method}: recorded input {} but got {input}",
            interaction.seq,
            interaction.input,
        );
        interaction
    }

    /// Pops the next output of `port::method` and decodes it as `T`.
    ///
    /// # Panics
    ///
    /// Panics as [`CassetteReplayer::next_interaction`] does, or if the
    /// output does not decode.
    pub fn next_value<T: DeserializeOwned>(&mut self, port: &str, method: &str) -> T {
        let interaction = self.next_interaction(port, method, &Value::Null);
        serde_json::from_value(interaction.output).unwrap_or_else(|e| {
            panic!("{port}::{method} seq={}: cannot decode output: {e}", interaction.seq)
        })
    }

    /// Pops the next output of `port::method` as a remote call result,
    /// recorded as `{"Ok": v}` or `{"Err": <RemoteError>}`.
    ///
    /// # Panics
    ///
    /// Panics as [`CassetteReplayer::next_interaction`] does, or if the
    /// output is not a recorded result.
    pub fn next_result<T: DeserializeOwned>(
        &mut self,
        port: &str,
        method: &str,
        input: &Value,
    ) -> Result<T, RemoteError> {
        let interaction = self.next_interaction(port, method, input);
        serde_json::from_value::<Result<T, RemoteError>>(interaction.output).unwrap_or_else(|e| {
            panic!("{port}::{method} seq={}: output is not a valid result: {e}", interaction.seq)
        })
    }
}

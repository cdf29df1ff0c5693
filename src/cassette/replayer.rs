//! Serves recorded outcomes back in order.

use std::collections::{HashMap, VecDeque};

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Cassette;
use crate::error::MemoriaError;

/// Per `port::method` queues of recorded outputs.
#[derive(Debug, Default)]
pub struct CassetteReplayer {
    queues: HashMap<(String, String), VecDeque<Value>>,
}

impl CassetteReplayer {
    /// Index a loaded cassette by port and method, keeping recording order.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<(String, String), VecDeque<Value>> = HashMap::new();
        let mut interactions: Vec<_> = cassette.interactions.iter().collect();
        interactions.sort_by_key(|i| i.seq);
        for interaction in interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction.output.clone());
        }
        Self { queues }
    }

    /// Pop the next recorded outcome and turn it back into a `Result`.
    ///
    /// A recorded `{"kind", "message"}` error comes back as the same
    /// [`MemoriaError`] variant; a bare `Err` string as
    /// [`MemoriaError::Backend`].
    ///
    /// # Errors
    ///
    /// Returns [`MemoriaError::Config`] when the cassette is exhausted for this
    /// port/method or the recorded value does not deserialize as `T`.
    pub fn next_result<T: DeserializeOwned>(
        &mut self,
        port: &str,
        method: &str,
    ) -> Result<T, MemoriaError> {
        let output = self
            .queues
            .get_mut(&(port.to_string(), method.to_string()))
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| {
                MemoriaError::Config(format!(
                    "Cassette exhausted: no interaction left for {port}::{method}"
                ))
            })?;

        if let Some(recorded) = output.get("Err") {
            return Err(replayed_error(recorded));
        }
        let value = output.get("Ok").cloned().unwrap_or(output);
        serde_json::from_value(value).map_err(|e| {
            MemoriaError::Config(format!(
                "Cassette value for {port}::{method} is invalid: {e}"
            ))
        })
    }
}

fn replayed_error(recorded: &Value) -> MemoriaError {
    if let Some(message) = recorded.as_str() {
        let message = message.strip_prefix("Backend error: ").unwrap_or(message);
        return MemoriaError::from_kind("backend", message.to_string());
    }
    let kind = recorded["kind"].as_str().unwrap_or("backend");
    let message = recorded["message"].as_str().unwrap_or("replayed error");
    MemoriaError::from_kind(kind, message.to_string())
}

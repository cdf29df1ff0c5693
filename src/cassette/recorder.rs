//! Captures port interactions and writes them as a cassette.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use super::{Cassette, Interaction};
use crate::error::MemoriaError;

/// Accumulates interactions in memory until [`CassetteRecorder::finish`].
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    commit: String,
    interactions: Vec<Interaction>,
}

impl CassetteRecorder {
    /// Create a recorder that will write to `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            commit: commit.into(),
            interactions: Vec::new(),
        }
    }

    /// Record the outcome of one call.
    ///
    /// Successes are stored as `{"Ok": value}`, failures as
    /// `{"Err": {"kind": ..., "message": ...}}` so the replayed error has the
    /// same variant. Values that fail to serialize are stored as `null`
    /// rather than aborting the live call being recorded.
    pub fn record<I, T>(
        &mut self,
        port: &str,
        method: &str,
        input: &I,
        result: &Result<T, MemoriaError>,
    ) where
        I: Serialize,
        T: Serialize,
    {
        let output = match result {
            Ok(value) => json!({ "Ok": serde_json::to_value(value).unwrap_or_default() }),
            Err(e) => json!({ "Err": { "kind": e.kind(), "message": e.detail() } }),
        };
        let seq = self.interactions.len() as u64;
        self.interactions.push(Interaction {
            seq,
            port: port.to_string(),
            method: method.to_string(),
            input: serde_json::to_value(input).unwrap_or_default(),
            output,
        });
    }

    /// Number of interactions recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Write the cassette to disk and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn finish(self) -> Result<PathBuf, MemoriaError> {
        let cassette = Cassette {
            name: self.name,
            recorded_at: Utc::now(),
            commit: self.commit,
            interactions: self.interactions,
        };
        cassette.save(&self.path)?;
        Ok(self.path)
    }
}

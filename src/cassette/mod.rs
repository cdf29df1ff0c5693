//! Record/replay of generator calls for deterministic tests.
//!
//! A cassette is a YAML file holding the ordered outcomes of calls through a
//! port. `MEMORIA_REC=1` records live calls, `MEMORIA_REPLAY=<file>` serves
//! them back without touching the network.

pub mod recorder;
pub mod replayer;

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MemoriaError;

/// A recorded session: metadata plus ordered port interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable cassette name.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made from.
    pub commit: String,
    /// Interactions in recording order.
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

/// One call through a port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Sequence number across the whole cassette.
    pub seq: u64,
    /// Port name (e.g. `"composite_generator"`).
    pub port: String,
    /// Method name (e.g. `"generate"`).
    pub method: String,
    /// Summary of the call's input; photos are reduced to their MIME types.
    #[serde(default)]
    pub input: serde_json::Value,
    /// `{"Ok": ...}` or `{"Err": {"kind": ..., "message": ...}}`.
    pub output: serde_json::Value,
}

impl Cassette {
    /// Read a cassette from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`MemoriaError::Config`] if the file is missing or malformed.
    pub fn load(path: &Path) -> Result<Self, MemoriaError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MemoriaError::Config(format!("Failed to read cassette {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            MemoriaError::Config(format!("Failed to parse cassette {}: {e}", path.display()))
        })
    }

    /// Write the cassette as YAML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), MemoriaError> {
        let yaml = serde_yaml::to_string(self).map_err(std::io::Error::other)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

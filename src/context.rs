//! Service context that bundles the generator port for one invocation.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::adapters::live::gemini::GeminiGenerator;
use crate::adapters::live::relay::RelayGenerator;
use crate::adapters::recording::RecordingGenerator;
use crate::adapters::replaying::ReplayingGenerator;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::Cassette;
use crate::config::{Config, GEMINI_KEY_ENV};
use crate::error::MemoriaError;
use crate::model::{resolve_model, validate_model};
use crate::ports::CompositeGenerator;

const STILL_SHARED: &str = "Recording adapter still has references";

/// Which transport performs the final send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// Call the backend directly with a locally held credential.
    Direct,
    /// Go through a relay at the given base URL.
    Relay(String),
}

/// Holds the generator chosen for this run.
pub struct ServiceContext {
    /// Composite generator port.
    pub generator: Box<dyn CompositeGenerator>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Write the recorded cassette to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the recorder is still shared or the file cannot be
    /// written. Drop the [`ServiceContext`] first.
    pub fn finish(self) -> Result<PathBuf, MemoriaError> {
        let Ok(recorder) = Arc::try_unwrap(self.recorder) else {
            return Err(MemoriaError::Config(STILL_SHARED.into()));
        };
        let recorder = recorder
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        recorder.finish()
    }
}

impl ServiceContext {
    /// Create a live context for the chosen transport.
    ///
    /// The credential is resolved here, once; a direct context without one
    /// fails before any request is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`MemoriaError::Config`] if the key is missing or the model is invalid.
    pub fn live(transport: &Transport, config: &Config) -> Result<Self, MemoriaError> {
        let generator: Box<dyn CompositeGenerator> = match transport {
            Transport::Direct => {
                let timeout = config.backend.timeout_secs.map(Duration::from_secs);
                Box::new(direct_generator(config, timeout)?)
            }
            Transport::Relay(url) => Box::new(RelayGenerator::new(url.clone())),
        };
        Ok(Self { generator })
    }

    /// Create a recording context that wraps a live adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if the live context cannot be created.
    pub fn recording(
        transport: &Transport,
        config: &Config,
    ) -> Result<(Self, RecordingSession), MemoriaError> {
        let live = Self::live(transport, config)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".memoria/cassettes")
            .join(&timestamp)
            .join("composite_generator.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-composite_generator"),
            get_commit_hash(),
        )));

        let generator = RecordingGenerator::new(live.generator, Arc::clone(&recorder));
        let ctx = Self {
            generator: Box::new(generator),
        };
        Ok((ctx, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, MemoriaError> {
        let cassette = Cassette::load(path)?;
        let replayer = Arc::new(Mutex::new(CassetteReplayer::new(&cassette)));
        Ok(Self {
            generator: Box::new(ReplayingGenerator::new(replayer)),
        })
    }
}

/// Build the direct Gemini generator from config, optionally time-bounded.
///
/// # Errors
///
/// Returns [`MemoriaError::Config`] if the key is missing or the model is invalid.
pub fn direct_generator(
    config: &Config,
    timeout: Option<Duration>,
) -> Result<GeminiGenerator, MemoriaError> {
    let Some(key) = config.gemini_key() else {
        return Err(MemoriaError::Config(format!(
            "No Gemini API key. Set {GEMINI_KEY_ENV} or add [keys] gemini to the config file."
        )));
    };
    let model = resolve_model(&config.backend.model);
    validate_model(&model).map_err(MemoriaError::Config)?;

    let endpoint = config.backend.endpoint.clone();
    let generator = GeminiGenerator::new(key, model).with_endpoint(endpoint);
    match timeout {
        Some(timeout) => generator.with_timeout(timeout),
        None => Ok(generator),
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeysConfig;

    #[test]
    fn relay_transport_needs_no_key() {
        let config = Config::default();
        let relay = Transport::Relay("http://localhost:8787".into());
        assert!(ServiceContext::live(&relay, &config).is_ok());
    }

    #[test]
    fn direct_with_key_from_file() {
        let config = Config {
            keys: KeysConfig {
                gemini: Some("from-file".into()),
            },
            ..Config::default()
        };
        let timeout = Some(Duration::from_secs(60));
        assert!(direct_generator(&config, timeout).is_ok());
    }

    #[test]
    fn replaying_missing_cassette_fails() {
        let missing = Path::new("/nonexistent/cassette.yaml");
        let err = ServiceContext::replaying(missing).err().unwrap();
        assert!(matches!(err, MemoriaError::Config(_)));
    }
}

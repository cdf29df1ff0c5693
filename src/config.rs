//! Configuration file loading with environment variable overrides.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::adapters::live::gemini::GEMINI_API_BASE;
use crate::model::DEFAULT_MODEL;

/// Environment variable that overrides `[keys] gemini`.
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default cap on a relay request body: two base64 phone photos fit easily.
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,
    /// Generation backend settings.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Relay server and relay client settings.
    #[serde(default)]
    pub relay: RelayConfig,
    /// Print fulfillment hand-off.
    #[serde(default)]
    pub print: PrintConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Gemini API key.
    pub gemini: Option<String>,
}

/// Generation backend settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Model name or alias.
    pub model: String,
    /// Base URL of the models endpoint.
    pub endpoint: String,
    /// Optional per-call timeout for direct generation, in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: GEMINI_API_BASE.to_string(),
            timeout_secs: None,
        }
    }
}

/// Relay settings, used by `serve` and by `generate --relay`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Address the relay binds to.
    pub bind: SocketAddr,
    /// Lifetime of an issued verification token, in seconds.
    pub token_ttl_secs: u64,
    /// Upper bound on one backend call made by the relay, in seconds.
    pub backend_timeout_secs: u64,
    /// Largest accepted `/generate-image` body, in bytes.
    pub max_body_bytes: usize,
    /// Relay base URL for clients; generation goes direct when unset.
    pub url: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8787)),
            token_ttl_secs: 900,
            backend_timeout_secs: 60,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            url: None,
        }
    }
}

impl RelayConfig {
    /// Token lifetime as a [`Duration`].
    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    /// Backend call bound as a [`Duration`].
    #[must_use]
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }
}

/// Print fulfillment settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    /// Operator's WhatsApp number in international format, digits only.
    pub whatsapp_number: Option<String>,
    /// Pre-filled chat message.
    pub message: String,
    /// Price shown to the customer.
    pub price: String,
    /// What the price buys.
    pub paper: String,
    /// Payment method name.
    pub payment_method: String,
    /// Name shown next to the payment details.
    pub payee: Option<String>,
    /// Link to the payment QR code image.
    pub payment_qr_url: Option<String>,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            whatsapp_number: None,
            message: "Hello! Please print this image.".to_string(),
            price: "S/5.00".to_string(),
            paper: "A4 photo paper".to_string(),
            payment_method: "Yape".to_string(),
            payee: None,
            payment_qr_url: None,
        }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Invalid config {}: {e}", path.display()))
    }

    /// Get the Gemini API key, preferring a non-empty environment variable.
    #[must_use]
    pub fn gemini_key(&self) -> Option<String> {
        let from_env = std::env::var(GEMINI_KEY_ENV).ok();
        pick_key(from_env, self.keys.gemini.as_deref())
    }
}

/// First non-blank key: the environment value, then the file value.
fn pick_key(from_env: Option<String>, from_file: Option<&str>) -> Option<String> {
    from_env
        .filter(|k| !k.trim().is_empty())
        .or_else(|| from_file.map(str::to_string))
        .filter(|k| !k.trim().is_empty())
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `MEMORIA_CONFIG` environment variable
/// 3. `~/.config/memoria/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }
    if let Ok(p) = std::env::var("MEMORIA_CONFIG") {
        return PathBuf::from(p);
    }
    std::env::var("HOME").map_or_else(
        |_| PathBuf::from("memoria.toml"),
        |home| PathBuf::from(home).join(".config/memoria/config.toml"),
    )
}

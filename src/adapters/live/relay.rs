//! Live adapter that generates through a `memoria serve` relay.
//!
//! The relay holds the backend credential; this side only needs the relay's
//! base URL. Each call fetches a fresh single-use token first.

use reqwest::Client;
use serde::Deserialize;

use crate::error::MemoriaError;
use crate::ports::composite_generator::{CompositeGenerator, CompositeImage, GenerateFuture};
use crate::request::GenerationRequest;
use crate::server::NONCE_HEADER;

const RELAY_FALLBACK_MESSAGE: &str = "The relay server reported an error.";
const RELAY_NO_IMAGE_MESSAGE: &str = "The relay could not generate the image.";

/// Sends generation requests to a relay instead of the backend.
pub struct RelayGenerator {
    client: Client,
    base_url: String,
}

impl RelayGenerator {
    /// Create a relay client for the given base URL (e.g. `http://localhost:8787`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_token(&self) -> Result<String, MemoriaError> {
        let url = format!("{}/token", self.base_url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MemoriaError::Backend {
                status: Some(status.as_u16()),
                message: "The relay refused to issue a verification token.".to_string(),
                raw: None,
            });
        }
        let issued: IssuedToken = response.json().await?;
        Ok(issued.token)
    }
}

impl CompositeGenerator for RelayGenerator {
    fn generate(&self, request: &GenerationRequest) -> GenerateFuture<'_> {
        let checked = request.validate().map(|()| request.clone());
        Box::pin(async move {
            let request = checked?;
            let token = self.fetch_token().await?;
            tracing::debug!(relay = %self.base_url, "posting generation request to relay");

            let response = self
                .client
                .post(format!("{}/generate-image", self.base_url))
                .header(NONCE_HEADER, token)
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            let text = response.text().await?;
            let raw: Option<serde_json::Value> = serde_json::from_str(&text).ok();
            let reply: RelayReply = raw
                .as_ref()
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default();

            if !status.is_success() {
                let message = reply
                    .message
                    .unwrap_or_else(|| RELAY_FALLBACK_MESSAGE.to_string());
                return Err(MemoriaError::Backend {
                    status: Some(status.as_u16()),
                    message,
                    raw,
                });
            }

            match reply {
                RelayReply {
                    success: true,
                    image_data: Some(data),
                    ..
                } if !data.is_empty() => Ok(CompositeImage::png(data)),
                RelayReply { message, .. } => Err(MemoriaError::Backend {
                    status: Some(status.as_u16()),
                    message: message.unwrap_or_else(|| RELAY_NO_IMAGE_MESSAGE.to_string()),
                    raw,
                }),
            }
        })
    }
}

#[derive(Deserialize)]
struct IssuedToken {
    token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelayReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    image_data: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

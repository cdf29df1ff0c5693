//! Relay request handlers and error-to-response mapping.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::{AppState, NONCE_HEADER};
use crate::error::MemoriaError;
use crate::prompt::caption_text;
use crate::request::GenerationRequest;

const NO_API_KEY: &str = "the backend API key is not configured";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    success: bool,
    image_data: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn issue_token(State(state): State<AppState>) -> Json<TokenResponse> {
    Json(TokenResponse {
        token: state.nonces.issue(),
    })
}

pub async fn generate_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, MemoriaError> {
    let token = headers
        .get(NONCE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    state.nonces.consume(token)?;

    let Json(request) = body.map_err(body_rejection)?;
    request.validate()?;

    let Some(generator) = state.generator.as_ref() else {
        return Err(MemoriaError::Config(NO_API_KEY.into()));
    };

    let image = generator.generate(&request).await?;
    let captioned = !caption_text(&request.name).is_empty();
    info!(captioned, "relayed generation succeeded");

    Ok(Json(GenerateResponse {
        success: true,
        image_data: image.data,
    }))
}

fn body_rejection(rejection: JsonRejection) -> MemoriaError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        MemoriaError::PayloadTooLarge(rejection.body_text())
    } else {
        let detail = rejection.body_text();
        MemoriaError::Validation(format!("malformed request body: {detail}"))
    }
}

impl IntoResponse for MemoriaError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Validation(_) | Self::Decode(_) => (StatusCode::BAD_REQUEST, "missing_params"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "invalid_nonce"),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            Self::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "no_api_key"),
            Self::Backend { .. } | Self::Io(_) | Self::ImageConversion(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "api_error")
            }
            Self::NoImage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "generation_error"),
        };

        let (message, raw) = match self {
            Self::Backend { message, raw, .. } => (message, raw),
            Self::NoImage { raw } => ("Could not generate the image.".to_string(), raw),
            other => (other.to_string(), None),
        };
        if status.is_server_error() {
            warn!(code, %message, "relay request failed");
        }

        let mut body = json!({ "success": false, "code": code, "message": message });
        if let Some(raw) = raw {
            body["response"] = raw;
        }
        (status, Json(body)).into_response()
    }
}

//! HTTP relay that re-exposes generation without revealing the credential.
//!
//! Routes:
//! - `GET /token` issues a single-use verification token
//! - `POST /generate-image` generates with the server-held credential
//! - `GET /health` liveness probe

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::error::MemoriaError;
use crate::nonce::NonceStore;
use crate::ports::CompositeGenerator;

/// Header carrying the single-use verification token.
pub const NONCE_HEADER: &str = "x-memoria-nonce";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Backend generator; `None` when no credential is configured.
    generator: Option<Arc<dyn CompositeGenerator>>,
    nonces: Arc<NonceStore>,
    max_body_bytes: usize,
}

impl AppState {
    /// Build relay state around an optional generator.
    #[must_use]
    pub fn new(generator: Option<Arc<dyn CompositeGenerator>>, token_ttl: Duration) -> Self {
        Self {
            generator,
            nonces: Arc::new(NonceStore::new(token_ttl)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Accept request bodies up to `bytes`; larger ones get `413`.
    #[must_use]
    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }
}

/// Build the relay router.
#[must_use]
pub fn router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);
    Router::new()
        .route("/health", get(handlers::health))
        .route("/token", get(handlers::issue_token))
        .route("/generate-image", post(handlers::generate_image))
        .with_state(state)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
}

/// Serve the relay on `addr` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run(addr: SocketAddr, state: AppState) -> Result<(), MemoriaError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("relay listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down relay");
        })
        .await?;
    Ok(())
}

//! HTTP surface: request parsing, response headers, and the router.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use docprint::{
    Artifact, ArtifactStore, Assembler, CacheConfig, Fingerprint, GenerationCache,
    TransactionRequest,
};
use serde_json::json;

use crate::errors::{cache_error_response, json_error};

/// Header carrying the hex fingerprint of the returned document.
pub const FINGERPRINT_HEADER: &str = "x-document-fingerprint";

/// Header reporting whether the document came from the store (`hit`) or was
/// rendered for this request (`miss`).
pub const CACHE_HEADER: &str = "x-cache";

pub type SharedCache = GenerationCache<Arc<dyn ArtifactStore>, Arc<dyn Assembler>>;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<SharedCache>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        assembler: Arc<dyn Assembler>,
        config: CacheConfig,
    ) -> Self {
        Self {
            cache: Arc::new(GenerationCache::new(store, assembler, config)),
        }
    }
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/pdf/generate", post(generate))
        .route("/api/pdf/{fingerprint}", get(fetch))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn generate(State(state): State<AppState>, body: Bytes) -> Response {
    tracing::debug!(bytes = body.len(), "received generate request");
    let request: TransactionRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!(error = %err, "malformed request body");
            return json_error(StatusCode::BAD_REQUEST, "malformed_request", err.to_string());
        }
    };

    match state.cache.get_or_generate(&request).await {
        Ok(generated) => {
            tracing::info!(
                fingerprint = %generated.fingerprint,
                outcome = generated.outcome.as_str(),
                bytes = generated.artifact.len(),
                "served document"
            );
            pdf_response(generated.fingerprint, generated.artifact, generated.outcome.is_hit())
        }
        Err(err) => cache_error_response(err),
    }
}

async fn fetch(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let fingerprint: Fingerprint = match raw.parse() {
        Ok(fingerprint) => fingerprint,
        Err(err) => {
            return json_error(
                StatusCode::BAD_REQUEST,
                "invalid_fingerprint",
                format!("expected 64 hex characters: {err}"),
            );
        }
    };

    match state.cache.get(&fingerprint).await {
        Ok(Some(artifact)) => pdf_response(fingerprint, artifact, true),
        Ok(None) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no document stored for {fingerprint}"),
        ),
        Err(err) => cache_error_response(err),
    }
}

fn pdf_response(fingerprint: Fingerprint, artifact: Artifact, hit: bool) -> Response {
    let cache = if hit { "hit" } else { "miss" };
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "inline; filename=invoice.pdf".to_string(),
            ),
            (HeaderName::from_static(FINGERPRINT_HEADER), fingerprint.to_hex()),
            (HeaderName::from_static(CACHE_HEADER), cache.to_string()),
        ],
        artifact.into_bytes(),
    )
        .into_response()
}


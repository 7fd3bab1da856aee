//! HTTP routes over the chain store.
//!
//! | Method | Path      | Description                                  |
//! |--------|-----------|----------------------------------------------|
//! | GET    | `/list`   | Full canonical chain, pretty-printed JSON    |
//! | POST   | `/write`  | Append a block carrying `{"BPM": <int>}`     |
//! | GET    | `/health` | Liveness probe with the current head index   |

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bpmchain_chain::{ChainError, ChainStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

const MAX_BODY_BYTES: usize = 1 << 20;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ChainStore>,
}

impl AppState {
    pub fn new(store: Arc<ChainStore>) -> Self {
        Self { store }
    }
}

/// Build the router with CORS, limits and request tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/list", get(list_blocks))
        .route("/write", post(write_block))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Body of `POST /write`.
#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    #[serde(rename = "BPM", alias = "bpm")]
    pub bpm: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub height: u64,
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    BadRequest(#[from] serde_json::Error),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Chain(ChainError::EmptyChain) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Chain(_) => StatusCode::CONFLICT,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// JSON body rendered with indentation.
struct PrettyJson<T>(StatusCode, T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec_pretty(&self.1) {
            Ok(body) => (self.0, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
            Err(err) => {
                warn!(error = %err, "failed to encode response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

async fn list_blocks(State(state): State<AppState>) -> Response {
    let chain = state.store.snapshot();
    PrettyJson(StatusCode::OK, chain.as_slice()).into_response()
}

// The body is decoded by hand so that clients need not send a JSON
// content type.
async fn write_block(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: WriteRequest = serde_json::from_slice(&body)?;
    let block = state.store.try_append(request.bpm)?;
    Ok(PrettyJson(StatusCode::CREATED, block))
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let head = state.store.head()?;
    Ok(Json(HealthResponse {
        status: "ok".into(),
        height: head.index(),
    }))
}

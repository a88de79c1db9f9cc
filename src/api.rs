//! HTTP surface: router, handlers and error mapping.
//!
//! Endpoints:
//! - GET  /                   - Liveness and version
//! - POST /api/process-query  - Answer a user query
//! - GET  /api/stats          - FAQ and account counts

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::config::ServerConfig;
use crate::error::BotError;
use crate::processor::{QueryProcessor, QueryRequest, QueryResponse};
use crate::store::StoreStats;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<QueryProcessor>,
}

// ============================================================================
// Errors
// ============================================================================

/// Error body, shaped `{"detail": "..."}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    /// 400 for an empty query, 500 with the error message for everything else.
    fn from_query_error(err: BotError) -> Self {
        if err.is_client_error() {
            return Self {
                status: StatusCode::BAD_REQUEST,
                detail: err.to_string(),
            };
        }

        let detail = format!("Error processing query: {}", err.detail());
        error!("{}", detail);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail,
        }
    }

    fn internal(context: &str, err: anyhow::Error) -> Self {
        let detail = format!("{}: {:#}", context, err);
        error!("{}", detail);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - Liveness check
async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Voice Bot API is running",
        "version": crate::VERSION,
    }))
}

/// POST /api/process-query - Answer a user query
async fn process_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    state
        .processor
        .process(&request.text)
        .map(Json)
        .map_err(ApiError::from_query_error)
}

/// GET /api/stats - FAQ and account counts
async fn stats(State(state): State<AppState>) -> Result<Json<StoreStats>, ApiError> {
    state
        .processor
        .store()
        .stats()
        .map(Json)
        .map_err(|e| ApiError::internal("Error reading stats", e))
}

// ============================================================================
// Router
// ============================================================================

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "skipping invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn create_router(processor: Arc<QueryProcessor>, config: &ServerConfig) -> Router {
    let state = AppState { processor };

    let api_routes = Router::new()
        .route("/process-query", post(process_query))
        .route("/stats", get(stats))
        .with_state(state);

    Router::new()
        .route("/", get(root))
        .nest("/api", api_routes)
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

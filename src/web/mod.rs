// Web server — Axum-based prediction API.
//
// All routes serve JSON. The loaded model lives behind a ModelHandle in the
// shared state, so POST /model/reload can swap in a new artifact while
// requests keep flowing against the old one.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::error::ModelError;
use crate::service::ModelHandle;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub model: ModelHandle,
    pub config: Arc<Config>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(config: Config, model: ModelHandle, port: u16, bind: &str) -> Result<()> {
    let state = AppState {
        model,
        config: Arc::new(config),
    };

    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("Tally API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(handlers::predict::predict))
        .route("/predict/batch", post(handlers::predict::predict_batch))
        .route("/categories", get(handlers::categories::list_categories))
        .route("/model/reload", post(handlers::model::reload))
        .route("/retrain", post(handlers::model::retrain))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness plus whether a model is loaded.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "timestamp": now(),
            "model_loaded": state.model.is_ready().await,
        })),
    )
}

/// RFC 3339 timestamp for response bodies.
pub fn now() -> String {
    Utc::now().to_rfc3339()
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message, "success": false })),
    )
        .into_response()
}

/// Map a core error onto an HTTP status.
pub fn model_error(err: &ModelError) -> Response {
    let status = match err {
        ModelError::EmptyInput => StatusCode::BAD_REQUEST,
        ModelError::ModelNotReady => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, &err.to_string())
}

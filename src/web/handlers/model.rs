// Model lifecycle handlers.
//
// POST /model/reload — read the artifact at TALLY_MODEL_PATH and swap it in.
//                      On failure the previously loaded model stays live.
// POST /retrain      — not implemented; training runs offline via `tally train`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::store;
use crate::web::{api_error, now, AppState};

/// POST /model/reload — hot-swap the model from disk.
pub async fn reload(State(state): State<AppState>) -> Response {
    let path = state.config.model_path.clone();
    let loaded = tokio::task::spawn_blocking(move || store::load(&path)).await;

    let artifact = match loaded {
        Ok(Ok(artifact)) => artifact,
        Ok(Err(e)) => {
            error!(error = %format!("{e:#}"), "Model reload failed");
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Model reload failed: {e:#}"),
            );
        }
        Err(e) => {
            error!(error = %e, "Model reload task panicked");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Model reload failed");
        }
    };

    let categories = artifact.pipeline.categories().to_vec();
    let trained_at = artifact.trained_at.to_rfc3339();
    state.model.swap(Arc::new(artifact.pipeline)).await;

    Json(serde_json::json!({
        "success": true,
        "trained_at": trained_at,
        "categories": categories,
        "timestamp": now(),
    }))
    .into_response()
}

/// POST /retrain — placeholder until online retraining exists.
pub async fn retrain() -> impl IntoResponse {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(serde_json::json!({
            "message": "Retraining endpoint not implemented yet",
            "success": false,
        })),
    )
}

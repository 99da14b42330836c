// GET /categories — every category the loaded model can predict.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::web::{model_error, now, AppState};

pub async fn list_categories(State(state): State<AppState>) -> Response {
    match state.model.list_categories().await {
        Ok(categories) => Json(serde_json::json!({
            "success": true,
            "count": categories.len(),
            "categories": categories,
            "timestamp": now(),
        }))
        .into_response(),
        Err(e) => model_error(&e),
    }
}

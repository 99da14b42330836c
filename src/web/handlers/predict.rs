// Prediction handlers.
//
// POST /predict        — { "description": "coffee at starbucks" }
// POST /predict/batch  — { "descriptions": ["coffee", "bus ticket", ...] }
//
// The model is checked first, so a server with nothing loaded answers 503
// regardless of the body. Batch items fail independently: a blank or
// non-string entry gets an `error` field and its siblings still get
// predictions.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::model::prediction::Prediction;
use crate::text::tokenize::normalize;
use crate::web::{api_error, model_error, now, AppState};

/// POST /predict — classify one description.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let model = match state.model.current().await {
        Ok(model) => model,
        Err(e) => return model_error(&e),
    };

    let Ok(Json(body)) = payload else {
        return api_error(StatusCode::BAD_REQUEST, "Request body must be valid JSON");
    };
    let Some(field) = body.get("description") else {
        return api_error(StatusCode::BAD_REQUEST, "Missing description field");
    };
    let Some(description) = field.as_str() else {
        return api_error(StatusCode::BAD_REQUEST, "Description must be a string");
    };
    if description.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "Description cannot be empty");
    }

    match model.predict_one(description) {
        Ok(prediction) => {
            info!(
                description,
                category = %prediction.category,
                confidence = %format!("{:.3}", prediction.confidence),
                "Prediction"
            );
            Json(json!({
                "success": true,
                "predicted_category": prediction.category,
                "confidence": prediction.confidence,
                "description": description,
                "cleaned_description": normalize(description),
                "all_predictions": ranked_pairs(&prediction, state.config.top_k),
                "timestamp": now(),
            }))
            .into_response()
        }
        Err(e) => {
            error!(error = %e, "Prediction failed");
            model_error(&e)
        }
    }
}

/// POST /predict/batch — classify many descriptions, one result per item.
pub async fn predict_batch(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let model = match state.model.current().await {
        Ok(model) => model,
        Err(e) => return model_error(&e),
    };

    let Ok(Json(body)) = payload else {
        return api_error(StatusCode::BAD_REQUEST, "Request body must be valid JSON");
    };
    let Some(field) = body.get("descriptions") else {
        return api_error(StatusCode::BAD_REQUEST, "Missing descriptions field");
    };
    let Some(items) = field.as_array() else {
        return api_error(StatusCode::BAD_REQUEST, "Descriptions must be a list");
    };
    if items.len() > state.config.max_batch {
        return api_error(
            StatusCode::BAD_REQUEST,
            &format!(
                "Batch of {} exceeds the limit of {}",
                items.len(),
                state.config.max_batch
            ),
        );
    }

    let texts: Vec<String> = items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect();
    let mut outcomes = model.predict_many(&texts).into_iter();

    let results: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_string() {
                return json!({
                    "index": index,
                    "description": item,
                    "error": "Description must be a string",
                });
            }
            match outcomes.next() {
                Some(Ok(prediction)) => json!({
                    "index": index,
                    "description": item,
                    "predicted_category": prediction.category,
                    "confidence": prediction.confidence,
                }),
                Some(Err(e)) => json!({
                    "index": index,
                    "description": item,
                    "error": e.to_string(),
                }),
                None => json!({
                    "index": index,
                    "description": item,
                    "error": "No result produced",
                }),
            }
        })
        .collect();

    info!(items = results.len(), "Batch prediction");

    Json(json!({
        "success": true,
        "results": results,
        "timestamp": now(),
    }))
    .into_response()
}

/// Top-k as `[category, probability]` pairs.
fn ranked_pairs(prediction: &Prediction, k: usize) -> Vec<Value> {
    prediction
        .top(k)
        .iter()
        .map(|r| json!([r.category, r.probability]))
        .collect()
}

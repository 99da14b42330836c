// HTTP route tests — the router driven in-process with tower's oneshot.
//
// No sockets are bound. Each test builds a fresh AppState, sends a single
// request and inspects status plus JSON body.

#![cfg(feature = "web")]

use std::path::Path;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use tally::config::Config;
use tally::model::pipeline::{Pipeline, PipelineParams};
use tally::service::ModelHandle;
use tally::web::{build_router, AppState};

fn config(model_path: &Path) -> Config {
    let model_path = model_path.display().to_string();
    Config::from_lookup(|key| match key {
        "TALLY_MODEL_PATH" => Some(model_path.clone()),
        "TALLY_TOP_K" => Some("2".to_string()),
        "TALLY_MAX_BATCH" => Some("3".to_string()),
        _ => None,
    })
    .unwrap()
}

fn pipeline() -> Pipeline {
    let texts = ["coffee at starbucks", "bus ticket", "grocery shopping", "uber ride"];
    let labels = ["food", "transport", "food", "transport"];
    Pipeline::fit(&PipelineParams::default(), &texts, &labels).unwrap()
}

fn state(loaded: bool) -> AppState {
    let model = if loaded {
        ModelHandle::with_model(Arc::new(pipeline()))
    } else {
        ModelHandle::empty()
    };
    AppState {
        model,
        config: Arc::new(config(Path::new("/nonexistent/tally/model.json"))),
    }
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = build_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

// ============================================================
// Health
// ============================================================

#[tokio::test]
async fn health_reports_model_state() {
    let (status, body) = send(state(true), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
    assert!(body["timestamp"].is_string());

    let (status, body) = send(state(false), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_loaded"], false);
}

// ============================================================
// POST /predict
// ============================================================

#[tokio::test]
async fn predict_returns_category_and_top_k() {
    let request = post_json("/predict", &json!({ "description": "  Coffee at STARBUCKS " }));
    let (status, body) = send(state(true), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["predicted_category"], "food");
    assert_eq!(body["cleaned_description"], "coffee at starbucks");
    assert_eq!(body["description"], "  Coffee at STARBUCKS ");

    let ranked = body["all_predictions"].as_array().unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0][0], "food");
    assert_eq!(ranked[0][1], body["confidence"]);
}

#[tokio::test]
async fn predict_rejects_bad_bodies() {
    for payload in [
        json!({}),
        json!({ "description": 42 }),
        json!({ "description": "   " }),
    ] {
        let (status, body) = send(state(true), post_json("/predict", &payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    let garbage = Request::post("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(state(true), garbage).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn predict_without_model_is_unavailable() {
    let request = post_json("/predict", &json!({ "description": "coffee" }));
    let (status, body) = send(state(false), request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "model not loaded");
}

// ============================================================
// POST /predict/batch
// ============================================================

#[tokio::test]
async fn batch_isolates_item_failures() {
    let request = post_json(
        "/predict/batch",
        &json!({ "descriptions": ["uber ride", "", 7] }),
    );
    let (status, body) = send(state(true), request).await;
    assert_eq!(status, StatusCode::OK);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);

    assert_eq!(results[0]["index"], 0);
    assert_eq!(results[0]["predicted_category"], "transport");
    assert!(results[0].get("error").is_none());

    assert_eq!(results[1]["index"], 1);
    assert_eq!(results[1]["error"], "description cannot be empty");

    assert_eq!(results[2]["index"], 2);
    assert_eq!(results[2]["error"], "Description must be a string");
}

#[tokio::test]
async fn batch_rejects_bad_shapes_and_oversize() {
    for payload in [
        json!({}),
        json!({ "descriptions": "coffee" }),
        json!({ "descriptions": ["a", "b", "c", "d"] }),
    ] {
        let (status, body) = send(state(true), post_json("/predict/batch", &payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn empty_batch_is_an_empty_result() {
    let request = post_json("/predict/batch", &json!({ "descriptions": [] }));
    let (status, body) = send(state(true), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], json!([]));
}

// ============================================================
// Categories and model lifecycle
// ============================================================

#[tokio::test]
async fn categories_lists_first_seen_order() {
    let (status, body) = send(state(true), get("/categories")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["categories"], json!(["food", "transport"]));

    let (status, _) = send(state(false), get("/categories")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn retrain_is_not_implemented() {
    let (status, body) = send(state(true), post_json("/retrain", &json!({}))).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Retraining endpoint not implemented yet");
}

#[tokio::test]
async fn failed_reload_keeps_serving_the_old_model() {
    let s = state(true);
    let request = Request::post("/model/reload").body(Body::empty()).unwrap();
    let (status, body) = send(s.clone(), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(s.model.is_ready().await);
}

#[tokio::test]
async fn reload_installs_model_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let artifact = tally::store::ModelArtifact::new(pipeline(), 4);
    tally::store::save(&path, &artifact).unwrap();

    let s = AppState {
        model: ModelHandle::empty(),
        config: Arc::new(config(&path)),
    };
    let request = Request::post("/model/reload").body(Body::empty()).unwrap();
    let (status, body) = send(s.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"], json!(["food", "transport"]));

    let request = post_json("/predict", &json!({ "description": "bus" }));
    let (status, body) = send(s, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted_category"], "transport");
}

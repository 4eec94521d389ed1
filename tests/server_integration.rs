use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use inferd::config::ModelsConfig;
use inferd::model::{BackendContext, BackendRegistry, LabelTable, TextBackend};
use inferd::server::router;
use inferd::service::InferenceService;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

fn create_test_app() -> Router {
    let ctx = BackendContext {
        models: ModelsConfig::default(),
        labels: Arc::new(LabelTable::from_entries([("cat", 281), ("dog", 207)])),
    };
    let registry = BackendRegistry::with_default_backends(ctx);
    router(Arc::new(InferenceService::new(registry)), 100)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

#[tokio::test]
async fn greet_echoes_the_caller() {
    let app = create_test_app();

    let (status, body) = post(&app, "/greet", json!({"name": "world"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hello, world!");
}

#[tokio::test]
async fn train_known_model_returns_ok() {
    let app = create_test_app();

    let (status, body) = post(
        &app,
        "/train",
        json!({"train_task": {"model": TextBackend::NAME}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn train_unknown_model_returns_error_status() {
    let app = create_test_app();

    let (status, body) = post(&app, "/train", json!({"train_task": {"model": "bert"}})).await;

    // Failures surface as an ERROR status, not as a transport error.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ERROR");
}

#[tokio::test]
async fn evaluate_without_served_model_returns_error_and_empty_results() {
    let app = create_test_app();

    let (status, body) = post(&app, "/evaluate", json!({"inputs": ["I am happy;joy"]})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ERROR");
    assert_eq!(body["results"], json!([]));
    assert_eq!(body["metric"], json!(0.0));
}

#[tokio::test]
async fn serve_then_evaluate_returns_results_and_metric_sum() {
    let app = create_test_app();

    let (_, body) = post(
        &app,
        "/serve-model",
        json!({"model": TextBackend::NAME}),
    )
    .await;
    assert_eq!(body["status"], "OK");

    let inputs = json!({
        "inputs": [
            "I am happy;joy",
            "I am happy;sad",
            "this is hopeless and miserable;sadness",
        ]
    });
    let (status, body) = post(&app, "/evaluate", inputs).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["input"], "I am happy;joy");
    assert_eq!(results[0]["output"], "joy");
    assert_eq!(results[2]["output"], "sadness");
    assert_eq!(body["metric"], json!(2.0));
}

#[tokio::test]
async fn one_malformed_input_fails_the_whole_batch() {
    let app = create_test_app();

    post(&app, "/serve-model", json!({"model": TextBackend::NAME})).await;

    let (status, body) = post(
        &app,
        "/evaluate",
        json!({"inputs": ["I am happy;joy", "no label segment"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ERROR");
    assert_eq!(body["results"], json!([]));
    assert_eq!(body["metric"], json!(0.0));
}

#[tokio::test]
async fn failed_serve_keeps_the_previous_model() {
    let app = create_test_app();

    post(&app, "/serve-model", json!({"model": TextBackend::NAME})).await;

    let (_, body) = post(&app, "/serve-model", json!({"model": "bert"})).await;
    assert_eq!(body["status"], "ERROR");

    let (_, body) = post(&app, "/evaluate", json!({"inputs": ["I am happy;joy"]})).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["metric"], json!(1.0));
}

#[tokio::test]
async fn evaluate_accepts_an_empty_batch() {
    let app = create_test_app();

    post(&app, "/serve-model", json!({"model": TextBackend::NAME})).await;

    let (status, body) = post(&app, "/evaluate", json!({"inputs": []})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["results"], json!([]));
    assert_eq!(body["metric"], json!(0.0));
}

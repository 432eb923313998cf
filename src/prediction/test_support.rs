//! Stub prediction backend for tests
//!
//! Serves `/predict`, `/health` and `/feature_importance` on an ephemeral
//! localhost port and records every prediction request it receives.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use std::sync::{Arc, Mutex};

/// A request seen by the stub
#[derive(Debug, Clone)]
pub(crate) struct ReceivedRequest {
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
pub(crate) struct StubBackend {
    status: StatusCode,
    body: String,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
}

impl StubBackend {
    /// Answers every prediction with the given probability
    pub fn probability(p: f64) -> Self {
        let body = serde_json::json!({
            "prediction": if p > 0.5 { 1 } else { 0 },
            "probability_diabetic": p,
            "probability_non_diabetic": 1.0 - p,
            "model": "logistic_regression",
        });
        Self::raw(StatusCode::OK, &body.to_string())
    }

    /// Answers every prediction with an error status
    pub fn failing(status: StatusCode) -> Self {
        Self::raw(status, r#"{"detail":"model exploded"}"#)
    }

    pub fn raw(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Start serving, returning the base URL
    pub async fn spawn(&self) -> String {
        let router = Router::new()
            .route("/predict", post(predict))
            .route("/health", get(health))
            .route("/feature_importance", get(feature_importance))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{}", addr)
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.received.lock().unwrap().clone()
    }
}

async fn predict(
    State(stub): State<StubBackend>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);

    stub.received
        .lock()
        .unwrap()
        .push(ReceivedRequest { content_type, body });

    (
        stub.status,
        [(header::CONTENT_TYPE, "application/json")],
        stub.body.clone(),
    )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "model_loaded": true}))
}

async fn feature_importance() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "feature_importance": {"Glucose": 1.12, "BMI": 0.69, "Age": 0.21},
        "message": "Higher absolute values indicate stronger influence"
    }))
}

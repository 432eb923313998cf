//! Prediction Backend Client
//!
//! HTTP client for the diabetes prediction service's REST API.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

use super::error::{PredictionError, PredictionResult};
use super::types::{
    FeatureImportance, FeatureImportanceBody, HealthStatus, PredictionRequest, PredictionResponse,
};

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// Something that can turn a request into a prediction
///
/// Implemented by [`PredictionClient`]; the form controller only depends on
/// this trait so it can be driven by other backends.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Submit one prediction request
    async fn predict(&self, request: &PredictionRequest) -> PredictionResult<PredictionResponse>;

    /// Port the backend is expected on, used in user-facing messages
    fn backend_port(&self) -> Option<u16>;
}

/// Configuration for the prediction client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend (e.g., "http://localhost:8001")
    pub base_url: String,
    /// Request timeout; `None` leaves the transport default in place
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
        }
    }
}

/// REST client for the prediction backend
pub struct PredictionClient {
    client: Client,
    base_url: Url,
    config: ClientConfig,
}

impl PredictionClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> PredictionResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| PredictionError::Config(format!("invalid base URL {:?}: {}", config.base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(PredictionError::Config(format!(
                "base URL {:?} cannot carry a path",
                config.base_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| PredictionError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full URL for an endpoint path such as `/predict`
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        )
    }

    /// Check backend liveness via `GET /health`
    pub async fn health(&self) -> PredictionResult<HealthStatus> {
        let response = self.client.get(self.endpoint("/health")).send().await?;

        if !response.status().is_success() {
            return Err(PredictionError::status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| PredictionError::decode(e.to_string()))
    }

    /// Fetch model coefficients via `GET /feature_importance`
    pub async fn feature_importance(&self) -> PredictionResult<FeatureImportance> {
        let response = self
            .client
            .get(self.endpoint("/feature_importance"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PredictionError::status(response.status().as_u16()));
        }

        let body: FeatureImportanceBody = response
            .json()
            .await
            .map_err(|e| PredictionError::decode(e.to_string()))?;

        Ok(body.into())
    }
}

#[async_trait]
impl Predictor for PredictionClient {
    async fn predict(&self, request: &PredictionRequest) -> PredictionResult<PredictionResponse> {
        let url = self.endpoint("/predict");
        tracing::debug!(url = %url, "Sending prediction request");

        // `.json()` sets Content-Type: application/json
        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %text, "Backend returned error status");
            return Err(PredictionError::status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PredictionError::decode(e.to_string()))?;

        PredictionResponse::from_json(body)
    }

    fn backend_port(&self) -> Option<u16> {
        self.base_url.port_or_known_default()
    }
}

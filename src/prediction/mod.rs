//! Prediction Backend Integration
//!
//! Everything needed to exchange one prediction with the backend.
//!
//! ## Architecture
//!
//! - **Types**: form input, request body, validated response
//! - **Client**: reqwest implementation of the [`Predictor`] trait
//! - **Errors**: one request-failure class plus schema violations
//!
//! ## Wire format
//!
//! ```text
//! POST /predict
//! {"Pregnancies":2,"Glucose":120,...,"Age":35}
//!
//! 200 OK
//! {"probability_diabetic":0.72, ...}
//! ```

mod client;
mod error;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{ClientConfig, PredictionClient, Predictor, DEFAULT_BASE_URL};
pub use error::{FailureCause, PredictionError, PredictionResult};
pub use types::{
    parse_number, FeatureImportance, FeatureWeight, Field, FormValues, HealthStatus,
    PredictionRequest, PredictionResponse,
};

//! # Diacheck
//!
//! Diabetes risk prediction client. Collects eight patient measurements,
//! submits them to a prediction backend and renders a
//! "Diabetic / Non-Diabetic" verdict from the returned probability.
//!
//! ## Modules
//!
//! - [`prediction`]: Request/response types and the backend HTTP client
//! - [`verdict`]: Probability threshold and result panel contents
//! - [`form`]: Submit/reset flow driving a [`FormView`]
//! - [`terminal`]: Command-line [`FormView`]
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use diacheck::prediction::{ClientConfig, Field, FormValues, PredictionClient};
//! use diacheck::form::FormController;
//! use diacheck::terminal::{OutputFormat, TerminalView};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PredictionClient::new(ClientConfig::default())?;
//!     let form = FormController::new(Arc::new(client), TerminalView::stdio(OutputFormat::Text));
//!
//!     form.fill(
//!         FormValues::new()
//!             .with(Field::Pregnancies, "2")
//!             .with(Field::Glucose, "120")
//!             .with(Field::BloodPressure, "70")
//!             .with(Field::SkinThickness, "20")
//!             .with(Field::Insulin, "80")
//!             .with(Field::Bmi, "28.5")
//!             .with(Field::DiabetesPedigreeFunction, "0.3")
//!             .with(Field::Age, "35"),
//!     )
//!     .await;
//!
//!     let result = form.submit().await?;
//!     println!("{}", result.label);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod form;
pub mod logging;
pub mod prediction;
pub mod terminal;
pub mod verdict;

// Re-export top-level types for convenience
pub use prediction::{
    ClientConfig, FailureCause, FeatureImportance, Field, FormValues, HealthStatus,
    PredictionClient, PredictionError, PredictionRequest, PredictionResponse, PredictionResult,
    Predictor,
};

pub use verdict::{RiskBand, UiResult, Verdict, DIABETIC_THRESHOLD};

pub use form::{FormController, FormView, Phase};

pub use terminal::{OutputFormat, TerminalView};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig, PredictorConfig};

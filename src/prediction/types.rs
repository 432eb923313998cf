//! Core data types for the prediction exchange
//!
//! - `Field`: the eight patient measurements collected by the form
//! - `FormValues`: raw text as typed by the user
//! - `PredictionRequest`: the JSON body sent to `POST /predict`
//! - `PredictionResponse`: the validated backend answer
//! - `HealthStatus` / `FeatureImportance`: auxiliary backend endpoints

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::error::PredictionError;

/// One of the eight patient measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Pregnancies,
    Glucose,
    BloodPressure,
    SkinThickness,
    Insulin,
    Bmi,
    DiabetesPedigreeFunction,
    Age,
}

impl Field {
    /// All fields in form order
    pub const ALL: [Field; 8] = [
        Field::Pregnancies,
        Field::Glucose,
        Field::BloodPressure,
        Field::SkinThickness,
        Field::Insulin,
        Field::Bmi,
        Field::DiabetesPedigreeFunction,
        Field::Age,
    ];

    /// Key used in the JSON request body
    pub fn key(&self) -> &'static str {
        match self {
            Field::Pregnancies => "Pregnancies",
            Field::Glucose => "Glucose",
            Field::BloodPressure => "BloodPressure",
            Field::SkinThickness => "SkinThickness",
            Field::Insulin => "Insulin",
            Field::Bmi => "BMI",
            Field::DiabetesPedigreeFunction => "DiabetesPedigreeFunction",
            Field::Age => "Age",
        }
    }

    /// Human-readable label for prompts
    pub fn label(&self) -> &'static str {
        match self {
            Field::Pregnancies => "Number of pregnancies",
            Field::Glucose => "Glucose level",
            Field::BloodPressure => "Blood pressure (mm Hg)",
            Field::SkinThickness => "Skin thickness (mm)",
            Field::Insulin => "Insulin level",
            Field::Bmi => "BMI",
            Field::DiabetesPedigreeFunction => "Diabetes pedigree function",
            Field::Age => "Age",
        }
    }

    fn index(&self) -> usize {
        match self {
            Field::Pregnancies => 0,
            Field::Glucose => 1,
            Field::BloodPressure => 2,
            Field::SkinThickness => 3,
            Field::Insulin => 4,
            Field::Bmi => 5,
            Field::DiabetesPedigreeFunction => 6,
            Field::Age => 7,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw form input, one string per field
///
/// Empty strings stand for fields the user left blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: [String; 8],
}

impl FormValues {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set a field
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Set the raw text of a field
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    /// Raw text of a field
    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    /// Empty every field
    pub fn clear(&mut self) {
        for value in self.values.iter_mut() {
            value.clear();
        }
    }

    /// True when no field holds any text
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| v.is_empty())
    }
}

/// Parse a number the way a browser's `parseFloat` does
///
/// Leading whitespace is skipped and the longest numeric prefix is used,
/// so `"28.5 kg"` gives 28.5. Input without a numeric prefix gives NaN.
pub fn parse_number(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return f64::NAN;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

/// JSON body of `POST /predict`
///
/// Non-finite values serialize as `null`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PredictionRequest {
    #[serde(rename = "Pregnancies")]
    pub pregnancies: f64,
    #[serde(rename = "Glucose")]
    pub glucose: f64,
    #[serde(rename = "BloodPressure")]
    pub blood_pressure: f64,
    #[serde(rename = "SkinThickness")]
    pub skin_thickness: f64,
    #[serde(rename = "Insulin")]
    pub insulin: f64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "DiabetesPedigreeFunction")]
    pub diabetes_pedigree_function: f64,
    #[serde(rename = "Age")]
    pub age: f64,
}

impl PredictionRequest {
    /// Build a request from raw form input. No range validation is applied.
    pub fn from_form(values: &FormValues) -> Self {
        let parse = |field| parse_number(values.get(field));
        Self {
            pregnancies: parse(Field::Pregnancies),
            glucose: parse(Field::Glucose),
            blood_pressure: parse(Field::BloodPressure),
            skin_thickness: parse(Field::SkinThickness),
            insulin: parse(Field::Insulin),
            bmi: parse(Field::Bmi),
            diabetes_pedigree_function: parse(Field::DiabetesPedigreeFunction),
            age: parse(Field::Age),
        }
    }

    /// Value of a single field
    pub fn value(&self, field: Field) -> f64 {
        match field {
            Field::Pregnancies => self.pregnancies,
            Field::Glucose => self.glucose,
            Field::BloodPressure => self.blood_pressure,
            Field::SkinThickness => self.skin_thickness,
            Field::Insulin => self.insulin,
            Field::Bmi => self.bmi,
            Field::DiabetesPedigreeFunction => self.diabetes_pedigree_function,
            Field::Age => self.age,
        }
    }

    /// Fields that did not parse to a number
    pub fn unparsed_fields(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|f| self.value(*f).is_nan())
            .collect()
    }
}

/// Validated answer of `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionResponse {
    /// Probability of the positive (diabetic) class, in [0, 1]
    pub probability_diabetic: f64,
    #[serde(default)]
    pub prediction: Option<i64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub probability_non_diabetic: Option<f64>,
    #[serde(default)]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub risk_category: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub features_used: Option<Vec<String>>,
}

impl PredictionResponse {
    /// Response carrying only a probability
    pub fn with_probability(probability_diabetic: f64) -> Self {
        Self {
            probability_diabetic,
            prediction: None,
            label: None,
            probability_non_diabetic: None,
            risk_score: None,
            risk_category: None,
            recommendation: None,
            model: None,
            features_used: None,
        }
    }

    /// Validate a decoded JSON body against the response schema
    ///
    /// `probability_diabetic` must be a number in [0, 1]; extra fields must
    /// have their documented types when present.
    pub fn from_json(body: serde_json::Value) -> Result<Self, PredictionError> {
        match body.get("probability_diabetic") {
            None => {
                return Err(PredictionError::InvalidResponse(
                    "missing probability_diabetic".to_string(),
                ))
            }
            Some(serde_json::Value::Number(_)) => {}
            Some(other) => {
                return Err(PredictionError::InvalidResponse(format!(
                    "probability_diabetic is not a number: {}",
                    other
                )))
            }
        }

        let response: PredictionResponse = serde_json::from_value(body)
            .map_err(|e| PredictionError::InvalidResponse(e.to_string()))?;

        let p = response.probability_diabetic;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(PredictionError::InvalidResponse(format!(
                "probability_diabetic out of range: {}",
                p
            )));
        }

        Ok(response)
    }
}

/// Answer of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
}

/// Weight of one feature in the backend model
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureWeight {
    pub feature: String,
    pub weight: f64,
}

/// Answer of `GET /feature_importance`, strongest feature first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureImportance {
    pub weights: Vec<FeatureWeight>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeatureImportanceBody {
    #[serde(default)]
    feature_importance: Option<HashMap<String, f64>>,
    #[serde(default)]
    message: Option<String>,
}

impl From<FeatureImportanceBody> for FeatureImportance {
    fn from(body: FeatureImportanceBody) -> Self {
        let mut weights: Vec<FeatureWeight> = body
            .feature_importance
            .unwrap_or_default()
            .into_iter()
            .map(|(feature, weight)| FeatureWeight { feature, weight })
            .collect();

        weights.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| a.feature.cmp(&b.feature))
        });

        Self {
            weights,
            message: body.message,
        }
    }
}

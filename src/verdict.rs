//! Verdict
//!
//! Turns the backend probability into what the result panel shows.
//! The label uses a fixed threshold: strictly above 0.5 is "Diabetic",
//! 0.5 itself and below is "Non-Diabetic".

use serde::Serialize;
use std::fmt;

use crate::prediction::PredictionResponse;

/// Probability above which a patient is labelled diabetic
pub const DIABETIC_THRESHOLD: f64 = 0.5;

/// Binary classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Diabetic,
    NonDiabetic,
}

impl Verdict {
    pub fn from_probability(probability: f64) -> Self {
        if probability > DIABETIC_THRESHOLD {
            Verdict::Diabetic
        } else {
            Verdict::NonDiabetic
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Diabetic => "Diabetic",
            Verdict::NonDiabetic => "Non-Diabetic",
        }
    }

    /// Status text color (hex)
    pub fn color(&self) -> &'static str {
        match self {
            Verdict::Diabetic => "#e74c3c",
            Verdict::NonDiabetic => "#2ecc71",
        }
    }

    /// Icon selector for the status icon
    pub fn icon(&self) -> &'static str {
        match self {
            Verdict::Diabetic => "notes-medical",
            Verdict::NonDiabetic => "heart",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Verdict::Diabetic => {
                "Based on statistical analysis, the patient shows a high probability of diabetes."
            }
            Verdict::NonDiabetic => {
                "Based on statistical analysis, the patient shows a low probability of diabetes."
            }
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Risk band derived from the risk score (probability x 100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub fn from_probability(probability: f64) -> Self {
        let score = probability * 100.0;
        if score >= 70.0 {
            RiskBand::High
        } else if score >= 40.0 {
            RiskBand::Moderate
        } else {
            RiskBand::Low
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RiskBand::Low => "Low Risk",
            RiskBand::Moderate => "Moderate Risk",
            RiskBand::High => "High Risk",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskBand::Low => "Maintain healthy lifestyle",
            RiskBand::Moderate => "Consider lifestyle changes and regular monitoring",
            RiskBand::High => "Consult a healthcare provider immediately",
        }
    }
}

/// Everything the result panel renders for one prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiResult {
    pub verdict: Verdict,
    pub label: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub probability: f64,
    pub risk_band: RiskBand,
}

impl UiResult {
    pub fn from_probability(probability: f64) -> Self {
        let verdict = Verdict::from_probability(probability);
        Self {
            verdict,
            label: verdict.label(),
            color: verdict.color(),
            icon: verdict.icon(),
            description: verdict.description(),
            probability,
            risk_band: RiskBand::from_probability(probability),
        }
    }

    pub fn from_response(response: &PredictionResponse) -> Self {
        Self::from_probability(response.probability_diabetic)
    }

    /// Risk score as a percentage
    pub fn risk_score(&self) -> f64 {
        self.probability * 100.0
    }
}

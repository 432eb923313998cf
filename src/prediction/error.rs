//! Prediction error types

use thiserror::Error;

/// Errors that can occur while talking to the prediction backend
#[derive(Error, Debug)]
pub enum PredictionError {
    /// The exchange with the backend failed (status, transport or body)
    #[error("Request failed: {cause}")]
    RequestFailed { cause: FailureCause },

    /// The body decoded but does not match the response schema
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A submission is already in flight
    #[error("A prediction request is already in flight")]
    Busy,

    /// Client could not be set up (bad base URL, TLS backend, ...)
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Detail of a failed request, kept for diagnostics only
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    #[error("HTTP error status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response body: {0}")]
    Decode(String),
}

impl PredictionError {
    pub fn status(status: u16) -> Self {
        PredictionError::RequestFailed {
            cause: FailureCause::Status(status),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        PredictionError::RequestFailed {
            cause: FailureCause::Decode(message.into()),
        }
    }

    /// True for errors produced by a failed exchange or a bad response
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            PredictionError::RequestFailed { .. } | PredictionError::InvalidResponse(_)
        )
    }
}

impl From<reqwest::Error> for PredictionError {
    fn from(e: reqwest::Error) -> Self {
        let cause = if e.is_timeout() {
            FailureCause::Timeout
        } else if e.is_connect() {
            FailureCause::Unreachable(e.to_string())
        } else if e.is_decode() {
            FailureCause::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            FailureCause::Status(status.as_u16())
        } else {
            FailureCause::Transport(e.to_string())
        };
        PredictionError::RequestFailed { cause }
    }
}

/// Result type alias for prediction operations
pub type PredictionResult<T> = Result<T, PredictionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PredictionError::status(500);
        assert_eq!(err.to_string(), "Request failed: HTTP error status 500");

        let err = PredictionError::InvalidResponse("missing probability_diabetic".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid response: missing probability_diabetic"
        );
    }

    #[test]
    fn test_request_failure_class() {
        assert!(PredictionError::status(404).is_request_failure());
        assert!(PredictionError::decode("eof").is_request_failure());
        assert!(PredictionError::InvalidResponse("x".into()).is_request_failure());
        assert!(!PredictionError::Busy.is_request_failure());
        assert!(!PredictionError::Config("x".into()).is_request_failure());
    }
}

//! Domain-specific error types for stress-lens

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Why a single analysis call failed.
///
/// Callers show every variant as the same "analysis failed" message; the variant is
/// kept for logs and diagnostics. None of them is retried here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("input text is empty")]
    EmptyInput,

    #[error("oracle unavailable: {message}")]
    OracleUnavailable { message: String },

    #[error("malformed oracle reply: {message}")]
    MalformedReply { message: String },

    #[error("invalid classification: {value}")]
    InvalidClassification { value: String },

    #[error("missing reasoning: {message}")]
    MissingReasoning { message: String },
}

impl AnalysisError {
    /// Stable tag for logs and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::EmptyInput => "empty_input",
            AnalysisError::OracleUnavailable { .. } => "oracle_unavailable",
            AnalysisError::MalformedReply { .. } => "malformed_reply",
            AnalysisError::InvalidClassification { .. } => "invalid_classification",
            AnalysisError::MissingReasoning { .. } => "missing_reasoning",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            AnalysisError::EmptyInput => "please enter some text to analyze",
            _ => "analysis failed",
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        AnalysisError::MalformedReply {
            message: message.into(),
        }
    }
}

/// Main error type for stress-lens
#[derive(Error, Debug)]
pub enum StressLensError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Report error: {message}")]
    Report { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<anyhow::Error> for StressLensError {
    fn from(err: anyhow::Error) -> Self {
        StressLensError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StressLensError {
    fn from(err: serde_json::Error) -> Self {
        StressLensError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for StressLensError {
    fn from(err: toml::de::Error) -> Self {
        StressLensError::Config {
            message: format!("TOML parse error: {}", err),
        }
    }
}

impl From<lopdf::Error> for StressLensError {
    fn from(err: lopdf::Error) -> Self {
        StressLensError::Report {
            message: format!("PDF encoding failed: {}", err),
        }
    }
}

impl From<std::io::Error> for StressLensError {
    fn from(err: std::io::Error) -> Self {
        StressLensError::Io {
            message: err.to_string(),
        }
    }
}

/// Convert StressLensError to an HTTP response
impl IntoResponse for StressLensError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            StressLensError::Analysis(err) => {
                let status = match err {
                    AnalysisError::EmptyInput => StatusCode::BAD_REQUEST,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (
                    status,
                    json!({ "error": err.user_message(), "kind": err.kind() }),
                )
            }
            StressLensError::Config { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Configuration error", "kind": "config", "details": message }),
            ),
            StressLensError::Report { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Report error", "kind": "report", "details": message }),
            ),
            StressLensError::Serialization { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Serialization error", "kind": "serialization", "details": message }),
            ),
            StressLensError::Io { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "I/O error", "kind": "io", "details": message }),
            ),
            StressLensError::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal error", "kind": "internal", "details": message }),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Result type alias for stress-lens operations
pub type Result<T> = std::result::Result<T, StressLensError>;

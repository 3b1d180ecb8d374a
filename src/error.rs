//! Domain-specific error types for calidad-agua

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the water-quality API
#[derive(Error, Debug)]
pub enum WaterError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Data load error: {message}")]
    DataLoad { message: String },

    #[error("Lexicon error: {message}")]
    Lexicon { message: String },

    #[error("Keyword table error: {message}")]
    Keywords { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("No data available: {message}")]
    NoData { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<anyhow::Error> for WaterError {
    fn from(err: anyhow::Error) -> Self {
        WaterError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for WaterError {
    fn from(err: serde_json::Error) -> Self {
        WaterError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for WaterError {
    fn from(err: csv::Error) -> Self {
        WaterError::DataLoad {
            message: format!("CSV error: {}", err),
        }
    }
}

impl From<std::io::Error> for WaterError {
    fn from(err: std::io::Error) -> Self {
        WaterError::DataLoad {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<toml::de::Error> for WaterError {
    fn from(err: toml::de::Error) -> Self {
        WaterError::Config {
            message: format!("TOML parse error: {}", err),
        }
    }
}

impl WaterError {
    /// HTTP status and short label for this error
    fn status_and_label(&self) -> (StatusCode, &'static str) {
        match self {
            WaterError::Config { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error"),
            WaterError::DataLoad { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "Data load error"),
            WaterError::Lexicon { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "Lexicon error"),
            WaterError::Keywords { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Keyword table error")
            }
            WaterError::Serialization { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Serialization error")
            }
            WaterError::Validation { .. } => (StatusCode::BAD_REQUEST, "Validation error"),
            WaterError::NoData { .. } => (StatusCode::SERVICE_UNAVAILABLE, "No data available"),
            WaterError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        }
    }
}

/// Convert WaterError to an HTTP response with a `{"detail": ...}` body
impl IntoResponse for WaterError {
    fn into_response(self) -> Response {
        let (status, label) = self.status_and_label();
        let details = match &self {
            WaterError::Config { message }
            | WaterError::DataLoad { message }
            | WaterError::Lexicon { message }
            | WaterError::Keywords { message }
            | WaterError::Serialization { message }
            | WaterError::Validation { message }
            | WaterError::NoData { message }
            | WaterError::Internal { message } => message.clone(),
        };
        if status.is_server_error() {
            tracing::error!("{}: {}", label, details);
        }
        (
            status,
            Json(json!({ "detail": details, "error": label })),
        )
            .into_response()
    }
}

/// Result type alias for calidad-agua operations
pub type Result<T> = std::result::Result<T, WaterError>;

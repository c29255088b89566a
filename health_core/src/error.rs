//! Error types shared by the health pipeline and the reference probe engine

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HealthError>;

#[derive(Error, Debug)]
pub enum HealthError {
    #[error("{0}")]
    Encode(#[from] serde_json::Error),

    #[error("{0}")]
    CheckFailed(String),

    #[error("check timed out after {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HealthError {
    pub fn check_failed(message: impl Into<String>) -> Self {
        HealthError::CheckFailed(message.into())
    }
}

/// Every variant is an internal fault from the caller's point of view. The message
/// is returned verbatim as a plain-text body.
impl IntoResponse for HealthError {
    fn into_response(self) -> Response {
        match &self {
            HealthError::Encode(err) => tracing::error!("Failed to encode health result: {}", err),
            other => tracing::error!("Health endpoint error: {}", other),
        }

        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(HealthError::check_failed("db down").to_string(), "db down");
        assert_eq!(
            HealthError::Timeout(Duration::from_millis(250)).to_string(),
            "check timed out after 250ms"
        );
        assert_eq!(
            HealthError::from(config::ConfigError::Message("bad route".to_string())).to_string(),
            "Configuration error: bad route"
        );
    }

    #[test]
    fn test_into_response_is_internal_server_error() {
        let response = HealthError::check_failed("boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

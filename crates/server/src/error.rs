//! Server error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::ConfigError;

/// Startup and serving errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration is invalid or missing required fields.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Binding or serving failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Errors a chat request can end with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Model(#[from] runtime::Error),

    #[error("turn exceeded {}s deadline", .0.as_secs())]
    Deadline(Duration),

    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Model(_) => StatusCode::BAD_GATEWAY,
            ApiError::Deadline(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.to_string();
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::Internal(format!("failed to store upload: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime::ModelError;

    #[test]
    fn statuses() {
        let model = ApiError::from(runtime::Error::from(ModelError::Network("reset".into())));
        assert_eq!(model.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(model.to_string(), "model service error: network: reset");
        assert_eq!(
            ApiError::Deadline(Duration::from_secs(300)).to_string(),
            "turn exceeded 300s deadline"
        );
        assert_eq!(
            ApiError::Deadline(Duration::from_secs(1)).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
    }
}

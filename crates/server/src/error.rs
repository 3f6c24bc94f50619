//! HTTP error mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lingxi_feedback::FeedbackError;
use lingxi_model::ModelError;
use serde::Serialize;
use thiserror::Error;

/// Error returned by every handler. Serialised as `{"error": message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or incomplete request
    #[error("{0}")]
    BadRequest(String),

    /// Failure while computing a response
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::BadRequest(message) => tracing::warn!(%message, "Rejected request"),
            Self::Internal(message) => tracing::error!(%message, "Request failed"),
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

impl From<FeedbackError> for ApiError {
    fn from(err: FeedbackError) -> Self {
        match err {
            FeedbackError::EmptyBatch | FeedbackError::MissingProductId(_) => {
                Self::BadRequest(err.to_string())
            }
            FeedbackError::StorePoisoned => Self::Internal(err.to_string()),
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

/// Malformed JSON is a client error, reported as 400 rather than 422.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_feedback_errors_map_to_status() {
        let status = |err: FeedbackError| ApiError::from(err).status();
        assert_eq!(status(FeedbackError::EmptyBatch), StatusCode::BAD_REQUEST);
        assert_eq!(status(FeedbackError::MissingProductId(2)), StatusCode::BAD_REQUEST);
        assert_eq!(status(FeedbackError::StorePoisoned), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_model_errors_are_bad_requests() {
        let err = ApiError::from(ModelError::InvalidRiskLevel(9));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "risk level 9 outside 1-4");
    }
}

//! Error types for pathwise-serve

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::PredictError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Inference pipeline fault; status depends on the variant
    #[error(transparent)]
    Predict(#[from] PredictError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// pathwise-common error
    #[error(transparent)]
    Common(#[from] pathwise_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Predict(ref err) => match err {
                PredictError::MissingField { .. } => {
                    (StatusCode::BAD_REQUEST, "MISSING_FIELD", err.to_string())
                }
                PredictError::NonNumericScore { .. } => {
                    (StatusCode::BAD_REQUEST, "NON_NUMERIC_SCORE", err.to_string())
                }
                PredictError::FeatureOrderMismatch { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "FEATURE_ORDER_MISMATCH",
                    err.to_string(),
                ),
                PredictError::Persistence(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_FAILURE",
                    err.to_string(),
                ),
                PredictError::Model(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    err.to_string(),
                ),
            },
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

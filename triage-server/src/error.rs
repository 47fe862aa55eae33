//! API error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{ClassifyError, ModelDiagnostics};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// The model never loaded; every request fails fast with diagnostics.
    #[error("Modelo no disponible")]
    ModelUnavailable(ModelDiagnostics),

    /// Preprocessing or inference failed for this request.
    #[error("Error al procesar audio: {0}")]
    Processing(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<ClassifyError> for ApiError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::ModelUnavailable(diag) => ApiError::ModelUnavailable(diag),
            ClassifyError::Preprocessing(e) => ApiError::Processing(e.to_string()),
            ClassifyError::Inference(e) => ApiError::Processing(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "detail": msg }),
            ),
            ApiError::ModelUnavailable(diag) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Modelo no disponible",
                    "model_path": diag.model_path.display().to_string(),
                    "model_exists": diag.model_exists,
                    "model_loaded": false,
                    "load_error": diag.load_error,
                    "load_traceback": diag.load_traceback,
                }),
            ),
            ApiError::Processing(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "detail": format!("Error al procesar audio: {msg}") }),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "detail": msg }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("parent not found: {0}")]
    ParentNotFound(String),

    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("zero vector cannot be normalized")]
    ZeroVector,

    #[error("unknown index type: {0}")]
    UnknownIndexType(String),

    #[error("embedder error: {0}")]
    EmbedderError(String),

    #[error("persistence error: {0}")]
    PersistenceError(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation timed out")]
    Timeout,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<std::io::Error> for IndexError {
    fn from(e: std::io::Error) -> Self {
        IndexError::PersistenceError(e.to_string())
    }
}

impl From<serde_json::Error> for IndexError {
    fn from(e: serde_json::Error) -> Self {
        IndexError::PersistenceError(e.to_string())
    }
}

impl IntoResponse for IndexError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            IndexError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            IndexError::ParentNotFound(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            IndexError::IntegrityViolation(_) => (StatusCode::CONFLICT, self.to_string()),
            IndexError::DimensionMismatch { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            IndexError::ZeroVector => (StatusCode::BAD_REQUEST, self.to_string()),
            IndexError::UnknownIndexType(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            IndexError::EmbedderError(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            IndexError::PersistenceError(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            IndexError::Cancelled => (StatusCode::from_u16(499).unwrap(), self.to_string()),
            IndexError::Timeout => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            IndexError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            IndexError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        };

        let body = json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

pub type IndexResult<T> = Result<T, IndexError>;

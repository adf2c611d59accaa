//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Construction-time errors. These abort application startup: a view-set
/// or site that fails to build never becomes routable.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("invalid action name: {0}")]
    InvalidAction(String),
    #[error("already registered: {0}")]
    AlreadyRegistered(String),
    #[error("missing option '{key}' for action '{action}'")]
    MissingOption { action: String, key: String },
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("base path must end with '/': {0}")]
    InvalidBasePath(String),
    #[error("delimiter must be '-', '_' or empty, got {0:?}")]
    InvalidDelimiter(String),
    #[error("invalid url fragment for action '{action}': {fragment}")]
    InvalidUrl { action: String, fragment: String },
}

/// Request-time errors. `NotFound` and `PermissionDenied` are recoverable
/// per-request and map to 404/403; the rest map to 4xx/5xx with the same
/// JSON envelope.
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("store: {0}")]
    Store(#[from] crate::store::StoreError),
    #[error("internal: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ViewError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ViewError::PermissionDenied(_) => (StatusCode::FORBIDDEN, "permission_denied"),
            ViewError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ViewError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            ViewError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
            ViewError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::{fmt, io};
use thiserror::Error;

/// Errors produced by the storage gateways.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("entity `{row}` not found in partition `{partition}`")]
    EntityNotFound { partition: String, row: String },
    #[error("entity `{row}` already exists in partition `{partition}`")]
    EntityConflict { partition: String, row: String },
    #[error("blob `{0}` not found")]
    BlobNotFound(String),
    #[error("file `{0}` not found")]
    FileNotFound(String),
    #[error("message `{id}` not found in queue `{queue}`")]
    MessageNotFound { queue: String, id: String },
    #[error("receipt for message `{id}` in queue `{queue}` is stale")]
    StaleReceipt { queue: String, id: String },
    #[error("{0}")]
    BadInput(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        let status = match &err {
            StorageError::EntityNotFound { .. }
            | StorageError::BlobNotFound(_)
            | StorageError::FileNotFound(_)
            | StorageError::MessageNotFound { .. } => StatusCode::NOT_FOUND,
            StorageError::EntityConflict { .. } | StorageError::StaleReceipt { .. } => {
                StatusCode::CONFLICT
            }
            StorageError::BadInput(_) => StatusCode::BAD_REQUEST,
            StorageError::Sqlx(_) | StorageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(status, err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

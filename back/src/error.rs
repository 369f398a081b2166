use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kanban_api::v1::{ErrorBody, ValidationError};
use tracing::{debug, error};

use crate::store::StoreError;

/// Everything a request can fail with. Each variant ends the request
/// with its status code and an `{"error": ...}` body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid task id")]
    InvalidId,
    #[error("Invalid JSON data")]
    InvalidBody,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Task not found")]
    NotFound,
    #[error("No fields to update")]
    NoFields,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Not found")]
    UnknownRoute,
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        source: StoreError,
    },
}

impl ApiError {
    /// Maps a store failure, keeping `context` for anything the caller can't fix.
    pub fn storage(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |err| match err {
            StoreError::NotFound(_) => Self::NotFound,
            StoreError::NoFields => Self::NoFields,
            source => Self::Storage { context, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::InvalidBody | Self::Validation(_) | Self::NoFields => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound | Self::UnknownRoute => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::Storage { context, source } => error!(%source, "{context}"),
            _ => debug!(status = status.as_u16(), error = %self, "rejected request"),
        }

        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

/// Response for a handler that panicked.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        String::from("unknown panic")
    };

    error!(%message, "request handler panicked");

    let body = ErrorBody {
        error: String::from("Internal server error"),
        message: Some(message),
    };

    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

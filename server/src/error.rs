//! Error Mapper: turns failures into status-coded JSON responses.
//!
//! # Design
//! The body mirrors what a browser or API client needs to explain the
//! failure: when it happened, the status, a short label, a message and the
//! request path. Field validation failures add an `errors` map. Messages of
//! unanticipated failures are replaced with a generic one and only logged.
//!
//! Form submissions never reach this module for validation failures; those
//! re-render the page with inline errors instead.

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use todo_core::{FieldErrors, TodoError};

const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

/// Failure categories the mapper distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    MethodNotAllowed,
    BadRequest,
    Validation,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::BadRequest | ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "Not Found",
            ErrorKind::MethodNotAllowed => "Method Not Allowed",
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Validation => "Validation Error",
            ErrorKind::Internal => "Internal Server Error",
        }
    }
}

/// A failure bound to the request path it happened on.
#[derive(Debug)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    errors: Option<FieldErrors>,
    path: String,
    source: Option<TodoError>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: None,
            path: path.into(),
            source: None,
        }
    }

    pub fn bad_request(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message, path)
    }

    fn validation(errors: FieldErrors, path: impl Into<String>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::new(ErrorKind::Validation, "Invalid input", path)
        }
    }

    /// Map a domain failure raised while serving `path`.
    pub fn from_todo(err: TodoError, path: impl Into<String>) -> Self {
        let path = path.into();
        match err {
            TodoError::NotFound(_) => Self::new(ErrorKind::NotFound, err.to_string(), path),
            TodoError::Validation(errors) => Self::validation(errors, path),
            TodoError::Storage(_) | TodoError::Migration(_) => Self {
                source: Some(err),
                ..Self::new(ErrorKind::Internal, INTERNAL_MESSAGE, path)
            },
        }
    }

    /// Adapter for `map_err` that tags domain failures with the request path.
    pub fn at(uri: &Uri) -> impl Fn(TodoError) -> AppError + '_ {
        move |err| AppError::from_todo(err, uri.path())
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.kind.status().as_u16(), self.path, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// JSON body of every mapped error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    pub path: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.kind.status();
        match &self.source {
            Some(source) => tracing::error!(
                status = %status,
                path = %self.path,
                error = %source,
                "request failed"
            ),
            None => tracing::debug!(
                status = %status,
                path = %self.path,
                message = %self.message,
                "request rejected"
            ),
        }

        let body = ErrorResponse {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: self.kind.label().to_string(),
            message: self.message,
            errors: self.errors,
            path: self.path,
        };
        (status, Json(body)).into_response()
    }
}

//! Response shaping.
//!
//! # Responsibilities
//! - Map controller errors to HTTP status codes with a JSON body
//! - Wrap accepted mutations in `202 Accepted`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::control::ControlError;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ControlError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ControlError::NotFound { .. } => (StatusCode::NOT_FOUND, "NotFound"),
            ControlError::DuplicateResource { .. } => (StatusCode::CONFLICT, "DuplicateResource"),
            ControlError::ImmutableObject { .. } => (StatusCode::CONFLICT, "ImmutableObject"),
            ControlError::InvalidOption { .. } => (StatusCode::BAD_REQUEST, "InvalidOption"),
            ControlError::Interrupted => (StatusCode::SERVICE_UNAVAILABLE, "Interrupted"),
            ControlError::Repository(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RepositoryError"),
        }
    }
}

impl IntoResponse for ControlError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = ErrorBody {
            error: kind,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// A mutation that was admitted and handed to the executor.
#[derive(Debug)]
pub struct Accepted<T>(pub T);

impl<T: Serialize> IntoResponse for Accepted<T> {
    fn into_response(self) -> Response {
        (StatusCode::ACCEPTED, Json(self.0)).into_response()
    }
}

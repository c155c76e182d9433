//! HTTP error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use printboard_core::{ErrorBody, StoreError};
use tracing::error;

/// A failed request: status plus `{ error, details }` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn bad_request(error: &str, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody::new(error, details),
        }
    }

    pub fn internal(error: &str, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody::new(error, details),
        }
    }

    /// Invalid input maps to 400, everything else to 500.
    pub fn store(error: &'static str) -> impl Fn(StoreError) -> Self {
        move |e| {
            if e.is_client_error() {
                Self::bad_request(error, e.to_string())
            } else {
                Self::internal(error, e.to_string())
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{}: {}", self.body.error, self.body.details);
        }
        (self.status, Json(self.body)).into_response()
    }
}

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Failure taxonomy for probe operations against the target service.
///
/// Every variant is recoverable: the suite runner turns each into a reported
/// failure line and keeps going.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("unexpected HTTP status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("service reported failure: {0}")]
    Application(String),

    #[error("fixture not found: {}", .0.display())]
    FixtureMissing(PathBuf),

    #[error("transport error: {0}")]
    Transport(String),
}

impl ProbeError {
    /// Classify a reqwest failure. `timeout_secs` is the deadline that was in
    /// effect for the request, reported back to the user on timeout.
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout(timeout_secs)
        } else if err.is_connect() {
            ProbeError::Connection(err.to_string())
        } else {
            ProbeError::Transport(err.to_string())
        }
    }
}

pub type ProbeResult<T, E = ProbeError> = Result<T, E>;

// Taken from https://github.com/tokio-rs/axum/blob/main/examples/anyhow-error-response/src/main.rs
#[derive(Debug)]
pub struct StubError {
    pub status: StatusCode,
    pub message: HttpErrorResponse,
}

#[derive(Debug, Serialize)]
pub struct HttpErrorResponse {
    error: String,
}

impl From<String> for HttpErrorResponse {
    fn from(message: String) -> Self {
        HttpErrorResponse { error: message }
    }
}

impl From<&str> for HttpErrorResponse {
    fn from(message: &str) -> Self {
        HttpErrorResponse {
            error: message.to_string(),
        }
    }
}

impl IntoResponse for StubError {
    fn into_response(self) -> Response {
        let mut res = Json(self.message).into_response();
        *res.status_mut() = self.status;
        res
    }
}

impl<E> From<E> for StubError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        StubError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: HttpErrorResponse::from(err.into().to_string()),
        }
    }
}

pub type StubResult<T, E = StubError> = Result<T, E>;

use std::io::Write;

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::StubResult;

/// Transcript string every upload gets back, regardless of content.
pub const CANNED_TRANSCRIPT: &str = "Test transcription successful. Audio file received.";

pub const SERVICE_NAME: &str = "VoiceInk Proxy";

#[derive(Serialize, Deserialize, Debug)]
pub struct StubHealthResponse {
    pub status: String,
    pub service: String,
    pub note: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StubTranscribeResponse {
    pub success: bool,
    pub text: String,
    pub metadata: StubMetadata,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StubMetadata {
    pub file_size: usize,
    pub temp_path: String,
}

/// Build the stub router: a fixed health payload, a canned transcription
/// response, 404 for everything else (including wrong methods on known
/// paths, matching the service being emulated).
pub fn router() -> Router {
    Router::new()
        .route("/health", get(handle_health).fallback(handle_not_found))
        .route("/transcribe", post(handle_transcribe).fallback(handle_not_found))
        .fallback(handle_not_found)
        // 10 MB limit
        .layer(DefaultBodyLimit::max(10_000_000))
        .layer(TraceLayer::new_for_http())
}

#[axum_macros::debug_handler]
async fn handle_health() -> Json<StubHealthResponse> {
    Json(StubHealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        note: "This is a test stand-in for VoiceInk transcription".to_string(),
    })
}

#[axum_macros::debug_handler]
async fn handle_transcribe(
    body: Bytes,
) -> StubResult<(StatusCode, Json<StubTranscribeResponse>)> {
    // The whole body is treated as opaque audio bytes; no multipart parsing.
    let mut temp = tempfile::Builder::new().suffix(".wav").tempfile()?;
    temp.write_all(&body)?;
    let temp_path = temp.path().display().to_string();
    info!(bytes = body.len(), %temp_path, "received audio upload");

    Ok((
        StatusCode::OK,
        Json(StubTranscribeResponse {
            success: true,
            text: CANNED_TRANSCRIPT.to_string(),
            metadata: StubMetadata {
                file_size: body.len(),
                temp_path,
            },
        }),
    ))
    // `temp` drops here, which unlinks the file on every exit path,
    // the early returns above included.
}

async fn handle_not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

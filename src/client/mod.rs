use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::error::{ProbeError, ProbeResult};

pub mod types;

use self::types::{HealthResponse, TranscribeOptions, Transcription, TranscriptionResponse};

/// How much of a non-JSON error body is kept for display.
const BODY_PREVIEW_LIMIT: usize = 500;

/// HTTP client driving the target transcription service through its two
/// endpoints. Holds no state beyond the connection pool; every call is
/// independent and bounded by its own timeout.
pub struct VoiceInkClient {
    client: Client,
    base_url: String,
    health_timeout: Duration,
    transcribe_timeout: Duration,
}

impl VoiceInkClient {
    pub fn new(config: &Config) -> Result<Self> {
        // Parse up front so a bad base URL fails at startup, not mid-suite.
        let base_url = Url::parse(&config.base_url)?;
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            health_timeout: Duration::from_secs(config.health_timeout_secs),
            transcribe_timeout: Duration::from_secs(config.transcribe_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}/health`.
    ///
    /// Succeeds only on HTTP 200 with a parseable payload whose status is
    /// `healthy`; every other outcome maps to a distinct [`ProbeError`].
    pub async fn check_health(&self) -> ProbeResult<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        debug!(%url, "checking service health");

        let response = self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(e, self.health_timeout.as_secs()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProbeError::HttpStatus {
                status,
                body: truncate_for_display(&body),
            });
        }

        let health: HealthResponse = response
            .json()
            .await
            .map_err(|e| ProbeError::Malformed(format!("invalid health payload: {e}")))?;
        if !health.is_healthy() {
            return Err(ProbeError::Application(format!(
                "service status is \"{}\"",
                health.status()
            )));
        }
        Ok(health)
    }

    /// Read an audio fixture and upload it. A missing file is reported as
    /// [`ProbeError::FixtureMissing`] before any network I/O happens.
    pub async fn transcribe_file(
        &self,
        path: &Path,
        options: &TranscribeOptions,
    ) -> ProbeResult<Transcription> {
        let audio = read_fixture(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());
        self.transcribe(audio, &filename, options).await
    }

    /// POST `{base_url}/api/transcribe` with a multipart body: the audio bytes
    /// as the `file` part (content type `audio/wav`) plus the option fields.
    pub async fn transcribe(
        &self,
        audio: Vec<u8>,
        filename: &str,
        options: &TranscribeOptions,
    ) -> ProbeResult<Transcription> {
        let url = format!("{}/api/transcribe", self.base_url);
        info!(%url, bytes = audio.len(), filename, "uploading audio for transcription");

        let file_part = Part::bytes(audio)
            .file_name(filename.to_string())
            .mime_str("audio/wav")
            .map_err(|e| ProbeError::Transport(e.to_string()))?;
        let mut form = Form::new().part("file", file_part);
        for (name, value) in options.form_fields() {
            form = form.text(name, value);
        }

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.transcribe_timeout)
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(e, self.transcribe_timeout.as_secs()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProbeError::HttpStatus {
                status,
                body: truncate_for_display(&body),
            });
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| ProbeError::Malformed(format!("invalid transcription payload: {e}")))?;
        parsed.into_result()
    }
}

async fn read_fixture(path: &Path) -> ProbeResult<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ProbeError::FixtureMissing(path.to_path_buf()))
        }
        Err(e) => Err(ProbeError::Transport(format!(
            "failed to read {}: {e}",
            path.display()
        ))),
    }
}

fn truncate_for_display(body: &str) -> String {
    if body.len() <= BODY_PREVIEW_LIMIT {
        return body.to_string();
    }
    let mut end = BODY_PREVIEW_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

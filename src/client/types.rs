use std::fmt::Display;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, ProbeResult};

/// Health payload of the target service.
///
/// Two shapes have been observed in the wild across service versions; both are
/// accepted, the nested one first. Everything beyond `status` is optional.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum HealthResponse {
    Nested(NestedHealth),
    Flat(FlatHealth),
}

#[derive(Deserialize, Debug, Clone)]
pub struct NestedHealth {
    pub status: String,
    pub service: Option<String>,
    pub version: Option<String>,
    pub transcription: TranscriptionStatus,
    pub api: ApiStatus,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionStatus {
    pub current_model: Option<String>,
    pub model_loaded: Option<bool>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatus {
    pub is_running: Option<bool>,
    pub requests_served: Option<u64>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FlatHealth {
    pub status: String,
    pub api_enabled: Option<bool>,
    pub current_model: Option<String>,
    pub api_diarization_model: Option<String>,
    pub models_loaded: Option<bool>,
}

impl HealthResponse {
    pub fn status(&self) -> &str {
        match self {
            HealthResponse::Nested(h) => &h.status,
            HealthResponse::Flat(h) => &h.status,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status() == "healthy"
    }

    pub fn service(&self) -> Option<&str> {
        match self {
            HealthResponse::Nested(h) => h.service.as_deref(),
            HealthResponse::Flat(_) => None,
        }
    }

    pub fn current_model(&self) -> Option<&str> {
        match self {
            HealthResponse::Nested(h) => h.transcription.current_model.as_deref(),
            HealthResponse::Flat(h) => h.current_model.as_deref(),
        }
    }

    pub fn model_loaded(&self) -> Option<bool> {
        match self {
            HealthResponse::Nested(h) => h.transcription.model_loaded,
            HealthResponse::Flat(h) => h.models_loaded,
        }
    }
}

#[derive(PartialEq, Deserialize, Serialize, Clone, Copy, Debug, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiarizationMode {
    Fast,
    Balanced,
    Quality,
}

impl Display for DiarizationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiarizationMode::Fast => write!(f, "fast"),
            DiarizationMode::Balanced => write!(f, "balanced"),
            DiarizationMode::Quality => write!(f, "quality"),
        }
    }
}

/// Optional form fields sent alongside the audio file part.
///
/// Boolean toggles follow the service contract: the field is present with the
/// value `"true"` when enabled and absent otherwise.
#[derive(Debug, Clone, Default)]
pub struct TranscribeOptions {
    pub enable_diarization: bool,
    pub diarization_mode: Option<DiarizationMode>,
    pub min_speakers: Option<u32>,
    pub max_speakers: Option<u32>,
    pub use_tinydiarize: bool,
}

impl TranscribeOptions {
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if self.enable_diarization {
            fields.push(("enable_diarization", "true".to_string()));
        }
        if let Some(mode) = self.diarization_mode {
            fields.push(("diarization_mode", mode.to_string()));
        }
        if let Some(min) = self.min_speakers {
            fields.push(("min_speakers", min.to_string()));
        }
        if let Some(max) = self.max_speakers {
            fields.push(("max_speakers", max.to_string()));
        }
        if self.use_tinydiarize {
            fields.push(("use_tinydiarize", "true".to_string()));
        }
        fields
    }
}

/// Raw transcription payload as returned by the service. All fields beyond
/// `success` are optional on the wire; use [`into_result`](Self::into_result)
/// to get a validated [`Transcription`].
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResponse {
    pub success: bool,
    pub text: Option<String>,
    pub error: Option<String>,
    pub speakers: Option<Vec<String>>,
    pub num_speakers: Option<u32>,
    pub segments: Option<Vec<SpeakerSegment>>,
    pub text_with_speakers: Option<String>,
    pub metadata: Option<TranscriptionMetadata>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SpeakerSegment {
    pub speaker: String,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionMetadata {
    pub model: Option<String>,
    pub duration: Option<f64>,
    pub processing_time: Option<f64>,
    pub transcription_time: Option<f64>,
    pub diarization_time: Option<f64>,
    pub diarization_method: Option<String>,
}

/// A validated successful transcription.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    pub speakers: Vec<String>,
    pub num_speakers: Option<u32>,
    pub segments: Vec<SpeakerSegment>,
    pub text_with_speakers: Option<String>,
    pub metadata: TranscriptionMetadata,
}

impl TranscriptionResponse {
    /// Enforce the response invariants: a failure must carry an error string,
    /// a success must carry a transcript.
    pub fn into_result(self) -> ProbeResult<Transcription> {
        if !self.success {
            return match self.error {
                Some(error) if !error.is_empty() => Err(ProbeError::Application(error)),
                _ => Err(ProbeError::Malformed(
                    "failure response carries no error string".to_string(),
                )),
            };
        }
        let text = self.text.ok_or_else(|| {
            ProbeError::Malformed("success response carries no transcript text".to_string())
        })?;
        Ok(Transcription {
            text,
            speakers: self.speakers.unwrap_or_default(),
            num_speakers: self.num_speakers,
            segments: self.segments.unwrap_or_default(),
            text_with_speakers: self.text_with_speakers,
            metadata: self.metadata.unwrap_or_default(),
        })
    }
}

//! Test harness for the VoiceInk transcription HTTP API: a client for its
//! health and transcribe endpoints, a suite runner that reports pass/fail per
//! scenario, and a stub server emulating the service for offline testing.

pub mod client;
pub mod config;
pub mod error;
pub mod stub;
pub mod suite;
pub mod telemetry;

pub use client::VoiceInkClient;
pub use config::Config;
pub use error::ProbeError;

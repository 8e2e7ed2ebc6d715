use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::client::types::{DiarizationMode, TranscribeOptions};
use crate::client::VoiceInkClient;
use crate::error::{ProbeError, ProbeResult};

/// One kind of probe against the target service.
#[derive(Debug, Clone)]
pub enum Check {
    Health,
    Transcribe {
        fixture: PathBuf,
        options: TranscribeOptions,
    },
    /// TDRZ speaker-turn detection needs a specially trained model variant,
    /// so this check consults `/health` before uploading anything.
    Tinydiarize { fixture: PathBuf },
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub check: Check,
}

impl Scenario {
    pub fn new(name: impl Into<String>, check: Check) -> Self {
        Scenario {
            name: name.into(),
            check,
        }
    }
}

/// Result of a single scenario: a short summary line on success, the
/// classified failure otherwise.
#[derive(Debug)]
pub struct CheckOutcome {
    pub name: String,
    pub result: ProbeResult<String>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub struct SuiteReport {
    pub outcomes: Vec<CheckOutcome>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.total()
    }
}

/// Run every scenario in order. Individual failures are recorded and the run
/// continues; the report always covers the full list.
pub async fn run_suite(client: &VoiceInkClient, scenarios: Vec<Scenario>) -> SuiteReport {
    let mut outcomes = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        let result = run_check(client, &scenario.check).await;
        match &result {
            Ok(summary) => info!(name = %scenario.name, %summary, "check passed"),
            Err(err) => warn!(name = %scenario.name, error = %err, "check failed"),
        }
        outcomes.push(CheckOutcome {
            name: scenario.name,
            result,
        });
    }
    SuiteReport { outcomes }
}

async fn run_check(client: &VoiceInkClient, check: &Check) -> ProbeResult<String> {
    match check {
        Check::Health => {
            let health = client.check_health().await?;
            Ok(match health.current_model() {
                Some(model) => format!("status healthy, model {model}"),
                None => "status healthy".to_string(),
            })
        }
        Check::Transcribe { fixture, options } => {
            let transcription = client.transcribe_file(fixture, options).await?;
            let mut summary = format!("transcript of {} chars", transcription.text.len());
            if let Some(n) = transcription.num_speakers {
                summary.push_str(&format!(", {n} speakers"));
            }
            Ok(summary)
        }
        Check::Tinydiarize { fixture } => {
            let health = client.check_health().await?;
            let model = health.current_model().unwrap_or("unknown");
            if !model.to_uppercase().contains("TDRZ") {
                return Err(ProbeError::Application(format!(
                    "current model \"{model}\" does not support tinydiarize"
                )));
            }
            let options = TranscribeOptions {
                enable_diarization: true,
                min_speakers: Some(2),
                use_tinydiarize: true,
                ..Default::default()
            };
            let transcription = client.transcribe_file(fixture, &options).await?;
            Ok(format!(
                "diarization method {}",
                transcription
                    .metadata
                    .diarization_method
                    .unwrap_or_else(|| "unknown".to_string())
            ))
        }
    }
}

/// The default scenario list: one full manual pass over the service, in the
/// order a human would run it.
pub fn default_scenarios(fixture_dir: &Path) -> Vec<Scenario> {
    vec![
        Scenario::new("Health Check", Check::Health),
        Scenario::new(
            "Basic Transcription",
            Check::Transcribe {
                fixture: fixture_dir.join("test_audio.wav"),
                options: TranscribeOptions::default(),
            },
        ),
        Scenario::new(
            "Diarization",
            Check::Transcribe {
                fixture: fixture_dir.join("conversation.wav"),
                options: TranscribeOptions {
                    enable_diarization: true,
                    diarization_mode: Some(DiarizationMode::Balanced),
                    min_speakers: Some(2),
                    max_speakers: Some(4),
                    ..Default::default()
                },
            },
        ),
        Scenario::new(
            "Tinydiarize",
            Check::Tinydiarize {
                fixture: fixture_dir.join("conversation.wav"),
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_passes_and_failures() {
        let report = SuiteReport {
            outcomes: vec![
                CheckOutcome {
                    name: "a".to_string(),
                    result: Ok("fine".to_string()),
                },
                CheckOutcome {
                    name: "b".to_string(),
                    result: Err(ProbeError::Connection("refused".to_string())),
                },
            ],
        };
        assert_eq!(report.passed(), 1);
        assert_eq!(report.total(), 2);
        assert!(!report.all_passed());
    }

    #[test]
    fn default_scenarios_cover_the_full_pass() {
        let scenarios = default_scenarios(Path::new("fixtures"));
        assert_eq!(scenarios.len(), 4);
        assert!(matches!(scenarios[0].check, Check::Health));
        match &scenarios[2].check {
            Check::Transcribe { fixture, options } => {
                assert!(fixture.ends_with("conversation.wav"));
                assert!(options.enable_diarization);
                assert_eq!(options.diarization_mode, Some(DiarizationMode::Balanced));
            }
            other => panic!("unexpected check {other:?}"),
        }
    }
}

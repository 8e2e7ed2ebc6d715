// Integration tests for the probe client and suite runner. Each test spawns a
// real axum service on an ephemeral port (the stub or a purpose-built
// fixture router) and drives it through the public client API.

use axum::extract::Multipart;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use voiceink_probe::client::types::{DiarizationMode, TranscribeOptions};
use voiceink_probe::client::VoiceInkClient;
use voiceink_probe::config::Config;
use voiceink_probe::error::ProbeError;
use voiceink_probe::stub::{self, CANNED_TRANSCRIPT};
use voiceink_probe::suite::{self, Check, Scenario};

fn test_config(base_url: &str) -> Config {
    Config {
        base_url: base_url.to_string(),
        health_timeout_secs: 1,
        transcribe_timeout_secs: 5,
        fixture_dir: ".".to_string(),
    }
}

async fn spawn_service(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A port nothing is listening on.
async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Accepts the real multipart contract and echoes what it received back
/// through the transcript text, so assertions can see exactly which parts
/// arrived and in which order.
async fn echo_transcribe(mut multipart: Multipart) -> Json<serde_json::Value> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap();
            parts.push(format!("file:{filename}:{content_type}:{}", bytes.len()));
        } else {
            let value = field.text().await.unwrap();
            parts.push(format!("{name}={value}"));
        }
    }
    Json(json!({ "success": true, "text": parts.join(";") }))
}

#[tokio::test]
async fn stub_health_passes_through_the_client() {
    let base = spawn_service(stub::router()).await;
    let client = VoiceInkClient::new(&test_config(&base)).unwrap();

    let health = client.check_health().await.unwrap();
    assert!(health.is_healthy());
    // The stub payload has no model fields; the accessors stay None.
    assert_eq!(health.current_model(), None);
}

#[tokio::test]
async fn unreachable_service_is_a_connection_error() {
    let base = unreachable_base_url().await;
    let client = VoiceInkClient::new(&test_config(&base)).unwrap();

    let err = client.check_health().await.unwrap_err();
    assert!(matches!(err, ProbeError::Connection(_)), "got {err:?}");
}

#[tokio::test]
async fn slow_health_endpoint_times_out() {
    let router = Router::new().route(
        "/health",
        get(|| async {
            tokio::time::sleep(std::time::Duration::from_secs(3)).await;
            "too late"
        }),
    );
    let base = spawn_service(router).await;
    let client = VoiceInkClient::new(&test_config(&base)).unwrap();

    let err = client.check_health().await.unwrap_err();
    assert!(matches!(err, ProbeError::Timeout(1)), "got {err:?}");
}

#[tokio::test]
async fn unhealthy_status_is_an_application_error() {
    let router = Router::new().route(
        "/health",
        get(|| async { Json(json!({"status": "unhealthy"})) }),
    );
    let base = spawn_service(router).await;
    let client = VoiceInkClient::new(&test_config(&base)).unwrap();

    let err = client.check_health().await.unwrap_err();
    assert!(matches!(err, ProbeError::Application(_)), "got {err:?}");
}

#[tokio::test]
async fn non_json_health_body_is_malformed() {
    let router = Router::new().route("/health", get(|| async { "all good, trust me" }));
    let base = spawn_service(router).await;
    let client = VoiceInkClient::new(&test_config(&base)).unwrap();

    let err = client.check_health().await.unwrap_err();
    assert!(matches!(err, ProbeError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn transcribe_sends_the_contract_multipart_fields() {
    let router = Router::new().route("/api/transcribe", post(echo_transcribe));
    let base = spawn_service(router).await;
    let client = VoiceInkClient::new(&test_config(&base)).unwrap();

    let options = TranscribeOptions {
        enable_diarization: true,
        diarization_mode: Some(DiarizationMode::Quality),
        min_speakers: Some(1),
        max_speakers: Some(4),
        use_tinydiarize: true,
    };
    let transcription = client
        .transcribe(vec![0u8; 256], "conversation.wav", &options)
        .await
        .unwrap();

    assert_eq!(
        transcription.text,
        "file:conversation.wav:audio/wav:256;\
         enable_diarization=true;\
         diarization_mode=quality;\
         min_speakers=1;\
         max_speakers=4;\
         use_tinydiarize=true"
    );
}

#[tokio::test]
async fn plain_upload_sends_only_the_file_part() {
    let router = Router::new().route("/api/transcribe", post(echo_transcribe));
    let base = spawn_service(router).await;
    let client = VoiceInkClient::new(&test_config(&base)).unwrap();

    let transcription = client
        .transcribe(vec![0u8; 64], "test_audio.wav", &TranscribeOptions::default())
        .await
        .unwrap();
    assert_eq!(transcription.text, "file:test_audio.wav:audio/wav:64");
}

#[tokio::test]
async fn server_side_failure_carries_its_error_string() {
    let router = Router::new().route(
        "/api/transcribe",
        post(|| async { Json(json!({"success": false, "error": "No transcription model loaded"})) }),
    );
    let base = spawn_service(router).await;
    let client = VoiceInkClient::new(&test_config(&base)).unwrap();

    let err = client
        .transcribe(vec![0u8; 16], "test_audio.wav", &TranscribeOptions::default())
        .await
        .unwrap_err();
    match err {
        ProbeError::Application(message) => {
            assert_eq!(message, "No transcription model loaded");
        }
        other => panic!("expected application error, got {other:?}"),
    }
}

#[tokio::test]
async fn failure_without_error_string_is_malformed() {
    let router = Router::new().route(
        "/api/transcribe",
        post(|| async { Json(json!({"success": false})) }),
    );
    let base = spawn_service(router).await;
    let client = VoiceInkClient::new(&test_config(&base)).unwrap();

    let err = client
        .transcribe(vec![0u8; 16], "test_audio.wav", &TranscribeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn non_200_reports_status_and_truncated_body() {
    // The stub serves /transcribe, not /api/transcribe, so the probe's upload
    // path lands on its 404 fallback.
    let base = spawn_service(stub::router()).await;
    let client = VoiceInkClient::new(&test_config(&base)).unwrap();

    let err = client
        .transcribe(vec![0u8; 16], "test_audio.wav", &TranscribeOptions::default())
        .await
        .unwrap_err();
    match err {
        ProbeError::HttpStatus { status, .. } => assert_eq!(status.as_u16(), 404),
        other => panic!("expected http status error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_fixture_short_circuits_before_the_network() {
    // An unreachable base URL: a network attempt would fail with a
    // connection error, so getting FixtureMissing proves nothing was sent.
    let base = unreachable_base_url().await;
    let client = VoiceInkClient::new(&test_config(&base)).unwrap();

    let err = client
        .transcribe_file(
            std::path::Path::new("/nonexistent/fixtures/take.wav"),
            &TranscribeOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::FixtureMissing(_)), "got {err:?}");
}

#[tokio::test]
async fn suite_completes_with_zero_passed_against_a_dead_service() {
    let base = unreachable_base_url().await;
    let client = VoiceInkClient::new(&test_config(&base)).unwrap();
    let fixtures = tempfile::tempdir().unwrap();

    let report = suite::run_suite(&client, suite::default_scenarios(fixtures.path())).await;
    assert_eq!(report.total(), 4);
    assert_eq!(report.passed(), 0);
    assert!(!report.all_passed());
    assert!(report.outcomes.iter().all(|o| o.result.is_err()));
}

#[tokio::test]
async fn suite_keeps_going_past_individual_failures() {
    // Against the stub: the health check passes, both uploads miss their
    // fixtures, and the tinydiarize gate rejects the model-less health
    // payload. All four outcomes must still be present, in order.
    let base = spawn_service(stub::router()).await;
    let client = VoiceInkClient::new(&test_config(&base)).unwrap();
    let fixtures = tempfile::tempdir().unwrap();

    let report = suite::run_suite(&client, suite::default_scenarios(fixtures.path())).await;
    assert_eq!(report.total(), 4);
    assert_eq!(report.passed(), 1);
    assert!(report.outcomes[0].passed());
    assert!(matches!(
        report.outcomes[1].result,
        Err(ProbeError::FixtureMissing(_))
    ));
    assert!(matches!(
        report.outcomes[3].result,
        Err(ProbeError::Application(_))
    ));
}

#[tokio::test]
async fn transcribing_a_real_fixture_against_an_accepting_service() {
    let router = Router::new().route(
        "/api/transcribe",
        post(|| async { Json(json!({"success": true, "text": CANNED_TRANSCRIPT})) }),
    );
    let base = spawn_service(router).await;
    let client = VoiceInkClient::new(&test_config(&base)).unwrap();

    let fixtures = tempfile::tempdir().unwrap();
    let path = fixtures.path().join("test_audio.wav");
    std::fs::write(&path, vec![0u8; 512]).unwrap();

    let report = suite::run_suite(
        &client,
        vec![Scenario::new(
            "Basic Transcription",
            Check::Transcribe {
                fixture: path,
                options: TranscribeOptions::default(),
            },
        )],
    )
    .await;
    assert!(report.all_passed());
}

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use clap_serde_derive::ClapSerde;

use voiceink_probe::client::types::{DiarizationMode, TranscribeOptions};
use voiceink_probe::client::VoiceInkClient;
use voiceink_probe::config::Config;
use voiceink_probe::suite::{self, Check, Scenario};
use voiceink_probe::telemetry::init_telemetry;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env, default_value = "VoiceinkProbe.toml")]
    config_file: String,

    /// Configuration options
    #[command(flatten)]
    pub opt_config: <Config as ClapSerde>::Opt,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check liveness of the target service
    Health,

    /// Upload one audio fixture for transcription
    Transcribe {
        /// Audio file, resolved against the fixture directory
        fixture: PathBuf,

        #[clap(long)]
        enable_diarization: bool,

        #[clap(long)]
        diarization_mode: Option<DiarizationMode>,

        #[clap(long)]
        min_speakers: Option<u32>,

        #[clap(long)]
        max_speakers: Option<u32>,

        #[clap(long)]
        use_tinydiarize: bool,
    },

    /// Run the full scenario suite
    Suite,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_telemetry();

    let args = Args::parse();
    let config = match Config::from_toml(&args.config_file) {
        Ok(conf) => conf.merge(args.opt_config),
        Err(err) => {
            if args.config_file == "VoiceinkProbe.toml" {
                Config::default().merge(args.opt_config)
            } else {
                bail!(
                    "Failed to read configuration file {} with error: {}",
                    args.config_file,
                    err
                );
            }
        }
    };

    let client = VoiceInkClient::new(&config)?;
    let fixture_dir = PathBuf::from(&config.fixture_dir);

    let scenarios = match args.cmd {
        Commands::Health => vec![Scenario::new("Health Check", Check::Health)],
        Commands::Transcribe {
            fixture,
            enable_diarization,
            diarization_mode,
            min_speakers,
            max_speakers,
            use_tinydiarize,
        } => {
            let options = TranscribeOptions {
                enable_diarization,
                diarization_mode,
                min_speakers,
                max_speakers,
                use_tinydiarize,
            };
            vec![Scenario::new(
                format!("Transcription of {}", fixture.display()),
                Check::Transcribe {
                    fixture: fixture_dir.join(fixture),
                    options,
                },
            )]
        }
        Commands::Suite => suite::default_scenarios(&fixture_dir),
    };

    let report = suite::run_suite(&client, scenarios).await;

    println!("\nResults for {}", client.base_url());
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(summary) => println!("  {}: PASSED ({summary})", outcome.name),
            Err(err) => println!("  {}: FAILED ({err})", outcome.name),
        }
    }
    println!("Total: {}/{} checks passed", report.passed(), report.total());

    Ok(if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

use anyhow::Result;
use clap_serde_derive::ClapSerde;
use serde::Deserialize;

#[derive(ClapSerde, Deserialize, Debug)]
pub struct Config {
    /// Base URL of the target transcription service
    #[arg(short, long, env, default_value = "http://localhost:5000")]
    pub base_url: String,

    /// Timeout for health checks, in seconds
    #[arg(long, env, default_value = "5")]
    pub health_timeout_secs: u64,

    /// Timeout for transcription requests, in seconds (transcription is long-running)
    #[arg(long, env, default_value = "120")]
    pub transcribe_timeout_secs: u64,

    /// Directory that audio fixture files are resolved against
    #[arg(short, long, env, default_value = ".")]
    pub fixture_dir: String,
}

impl Config {
    pub fn from_toml(path: &str) -> Result<Self> {
        let str = std::fs::read_to_string(path)?;
        let config = toml::from_str(&str)?;
        Ok(config)
    }
}

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use voiceink_probe::stub;
use voiceink_probe::telemetry::init_telemetry;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The address the listener binds to
    #[arg(short, long, env, default_value = "127.0.0.1")]
    address: String,

    /// The port the listener binds to
    #[arg(short, long, env, default_value = "5001")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry();

    let args = Args::parse();
    let listener = TcpListener::bind(format!("{}:{}", args.address, args.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, stub::router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down..."),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}

//! CLI entry point for the mock print API: serves the credential, storage and
//! job-log endpoints locally so `print-drop` can be pointed at it.

use axum::http::StatusCode;
use clap::Parser;
use print_drop::sim::{self, MockSettings};
use std::net::SocketAddr;

/// Mock print API
#[derive(Parser, Debug)]
#[command(name = "mock-print-api", about = "Local stand-in for the print queue API and its object store.")]
pub struct Cli {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Base URL written into issued upload URLs (defaults to the bound address)
    #[arg(long)]
    public_url: Option<String>,

    /// Path serving the credential request and the job log
    #[arg(long, default_value = sim::DEFAULT_API_PATH)]
    api_path: String,

    /// Answer every credential request with this HTTP status
    #[arg(long, value_parser = parse_status)]
    fail_credentials: Option<StatusCode>,

    /// Answer every storage upload with this HTTP status
    #[arg(long, value_parser = parse_status)]
    fail_storage: Option<StatusCode>,

    /// Answer every job log with this HTTP status
    #[arg(long, value_parser = parse_status)]
    fail_log: Option<StatusCode>,

    /// Leave `jobId` out of job-log responses
    #[arg(long)]
    omit_job_id: bool,

    /// Log request details
    #[arg(short, long)]
    verbose: bool,
}

fn parse_status(s: &str) -> Result<StatusCode, String> {
    let code: u16 = s.parse().map_err(|_| format!("'{}' is not a status code", s))?;
    StatusCode::from_u16(code).map_err(|e| format!("'{}': {}", s, e))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
        .init();

    let settings = MockSettings {
        public_url: cli.public_url,
        api_path: cli.api_path,
        fail_credentials: cli.fail_credentials,
        fail_storage: cli.fail_storage,
        fail_log: cli.fail_log,
        omit_job_id: cli.omit_job_id,
    };
    let (_, state) = sim::spawn(settings, cli.bind).await?;
    tracing::info!("Point print-drop at --endpoint {}", state.endpoint());

    tokio::signal::ctrl_c().await?;
    tracing::info!(
        "Shutting down; {} object(s) stored, {} job(s) logged",
        state.object_count(),
        state.jobs().len()
    );
    Ok(())
}

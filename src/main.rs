// src/main.rs - Submit one PDF to the print queue
use clap::Parser;
use print_drop::config::{self, Config, LoggingConfig};
use print_drop::{FileManager, HttpPrintApi, UploadForm};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Registry, reload};

type LevelHandle = reload::Handle<LevelFilter, Registry>;

/// Upload a PDF and we'll handle the rest.
#[derive(Parser, Debug)]
#[command(name = "print-drop", about = "Send a single PDF to the print queue.")]
struct Cli {
    /// PDF to print
    file: PathBuf,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print API endpoint (overrides the config file)
    #[arg(long)]
    endpoint: Option<String>,

    /// Number of copies; the leading whole number is used, anything below 1 prints one
    #[arg(short = 'n', long, default_value = "1", allow_hyphen_values = true)]
    copies: String,

    /// Print in color
    #[arg(long)]
    color: bool,

    /// Log request details
    #[arg(short, long)]
    verbose: bool,
}

/// Level filter in effect before the config file is read.
fn startup_filter(verbose: bool) -> (reload::Layer<LevelFilter, Registry>, LevelHandle) {
    reload::Layer::new(if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO })
}

/// `--verbose` wins over the configured level.
fn apply_config_level(handle: &LevelHandle, verbose: bool, logging: &LoggingConfig) -> Result<(), config::ConfigError> {
    if verbose {
        return Ok(());
    }
    let level = LevelFilter::from_level(logging.max_level()?);
    handle
        .reload(level)
        .map_err(|e| config::ConfigError::Invalid(format!("cannot apply log level: {}", e)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    let (filter, level_handle) = startup_filter(cli.verbose);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &cli.config {
        Some(path) => config::load_config(&path.to_string_lossy())?,
        None => Config::default(),
    };
    if let Some(endpoint) = &cli.endpoint {
        config.api.endpoint = endpoint.clone();
        config.validate()?;
    }
    apply_config_level(&level_handle, cli.verbose, &config.logging)?;

    let api = HttpPrintApi::new(&config.api.endpoint)?;
    tracing::info!("Print API: {}", api.endpoint());
    let mut form = UploadForm::new(Arc::new(api), config.form);

    let mut status = form.watch_status();
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let line = status.borrow_and_update().clone();
            if !line.is_empty() {
                tracing::info!("{}", line);
            }
        }
    });

    let file = FileManager::new().load_pdf(&cli.file).await?;
    form.select_file(file)?;
    form.set_copies(&cli.copies);
    if cli.color && !config.form.color_option {
        tracing::warn!("--color ignored: this print queue has no color option");
    }
    form.set_color(cli.color);

    let result = form.submit().await;
    print!("{}", form.view());
    if let Err(e) = &result {
        if e.is_local() {
            tracing::warn!("Nothing was sent to the print queue");
        }
    }
    result?;
    Ok(())
}

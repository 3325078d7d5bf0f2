//! Breachcheck command-line driver.
//!
//! This is the thin shell that loads configuration, wires the scanner
//! together and writes the report as JSON. Pipeline logic lives in
//! `breachcheck-scanner`.

use anyhow::Context;
use breachcheck_core::{AppConfig, BatchReport, BatchSummary};
use breachcheck_scanner::{
    BatchRunner, CancellationToken, HttpLookupClient, RateLimiter, RecordParser,
};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Check every email in a CSV file against known breach corpora.
#[derive(Debug, Parser)]
#[command(name = "breachcheck", version, about)]
pub struct Cli {
    /// CSV file with one email address in the first column of each row
    pub input: PathBuf,

    /// Config file (defaults to the XDG config location)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the lookup endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Override the minimum delay between lookups, in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Override the per-lookup timeout, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit single-line JSON
    #[arg(long)]
    pub compact: bool,
}

/// JSON document written for a finished run.
#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    /// When the run finished
    pub generated_at: DateTime<Utc>,
    /// Input file the report was built from
    pub input: String,
    /// Per-state counts
    pub summary: BatchSummary,
    /// The report itself
    pub report: &'a BatchReport,
}

/// Initialize tracing subscriber for logging.
///
/// Logs go to stderr so the JSON report on stdout stays clean.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,breachcheck=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Resolve configuration: file, then environment, then command-line flags.
pub fn resolve_config(cli: &Cli) -> breachcheck_core::Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let mut config = config.apply_env_overrides();

    if let Some(endpoint) = &cli.endpoint {
        config.lookup.endpoint.clone_from(endpoint);
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.throttle.interval_ms = interval_ms;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.lookup.timeout_secs = timeout_secs;
    }

    config.validate()?;
    Ok(config)
}

/// Run a batch over the input file.
///
/// A file that cannot be read or is not CSV still yields a report, with
/// the ingestion error set.
pub async fn execute(
    cli: &Cli,
    config: &AppConfig,
    cancel: &CancellationToken,
) -> anyhow::Result<BatchReport> {
    let parser = RecordParser::new();
    let input = match parser.read_path(&cli.input) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Could not read {}: {}", cli.input.display(), e);
            return Ok(BatchReport::ingestion_failed(e));
        }
    };

    let client = HttpLookupClient::new(&config.lookup)
        .context("failed to set up lookup client")?;
    let runner = BatchRunner::new(
        Arc::new(client),
        RateLimiter::new(config.throttle.interval()),
    )
    .with_parser(parser);

    info!(
        "Checking {} against {}",
        cli.input.display(),
        config.lookup.endpoint
    );
    Ok(runner.run_with_cancellation(&input, cancel).await)
}

/// Serialize the report document.
pub fn render(cli: &Cli, report: &BatchReport) -> anyhow::Result<String> {
    let document = ReportDocument {
        generated_at: Utc::now(),
        input: cli.input.display().to_string(),
        summary: report.summary(),
        report,
    };

    let json = if cli.compact {
        serde_json::to_string(&document)?
    } else {
        serde_json::to_string_pretty(&document)?
    };
    Ok(json)
}

/// Full command: configure, run, write output.
pub async fn run(cli: Cli) -> anyhow::Result<BatchReport> {
    let config = resolve_config(&cli)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with the results collected so far");
            on_interrupt.cancel();
        }
    });

    let report = execute(&cli, &config, &cancel).await?;
    let json = render(&cli, &report)?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(report)
}

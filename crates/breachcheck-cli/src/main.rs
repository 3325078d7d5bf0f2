use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    breachcheck_cli::init_tracing();
    tracing::info!("Starting breachcheck v{}", env!("CARGO_PKG_VERSION"));

    let cli = breachcheck_cli::Cli::parse();
    match breachcheck_cli::run(cli).await {
        Ok(report) if report.ingestion_error().is_some() => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

use clap::Parser;
use spec_vendor::cli::{run, Cli, RunOutcome};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let cli = Cli::parse();
    tracing::info!("CLI arguments parsed, invoking run");
    match run(cli).await {
        Ok(RunOutcome::Success) => {
            tracing::info!("CLI completed successfully");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Failed) => {
            tracing::error!("CLI completed with failures");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = ?e, "CLI exited with error");
            ExitCode::FAILURE
        }
    }
}

//! Multi-cloud dashboard API server

#![allow(missing_docs)]

use clap::Parser;
use multicloud_dashboard::config::Config;
use multicloud_dashboard::server;
use multicloud_dashboard::utils::init_tracing;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "dashboard", version, about = "Multi-cloud cost and metrics dashboard API")]
struct Cli {
    /// YAML configuration file; a missing file falls back to defaults plus environment
    #[arg(
        short,
        long,
        env = "DASHBOARD_CONFIG",
        default_value = "config/dashboard.yaml"
    )]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Missing .env is fine
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match Config::load(&cli.config).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(config.logging()) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match server::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

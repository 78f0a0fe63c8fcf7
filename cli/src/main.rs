use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use framer_application::error::AppError;
use framer_cli::bootstrap::state::AppState;
use framer_cli::commands::{self, Cli};
use framer_cli::config_loader;
use framer_cli::observability;

const CLIENT_ERROR_EXIT: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let loaded = match config_loader::load_config() {
        Ok(loaded) => loaded,
        Err(e) => return startup_failure(&e),
    };
    let config = loaded.config;

    if let Err(e) = observability::tracing::setup_logging(&config) {
        return startup_failure(e.as_ref());
    }

    if loaded.generated_env_file {
        info!("Generated .env from template. Please review it.");
    }
    info!("Starting Framer");
    observability::startup_info::log_config_info(&config);

    let state = match AppState::new(config).await {
        Ok(state) => state,
        Err(e) => return report(&e),
    };

    let result = commands::run(&state, cli.command).await;
    state.close().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn report(e: &AppError) -> ExitCode {
    if e.is_client_error() {
        warn!(error = %e, "Request rejected");
        ExitCode::from(CLIENT_ERROR_EXIT)
    } else {
        error!(error = %e, "Command failed");
        ExitCode::FAILURE
    }
}

/// Logging is not up yet, so this goes straight to stderr.
fn startup_failure(e: &dyn Error) -> ExitCode {
    writeln!(io::stderr(), "framer: {e}").ok();
    ExitCode::FAILURE
}

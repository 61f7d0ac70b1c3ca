//! Binary entry point: logging setup, dispatch, error rendering.

mod cli;
mod error_fmt;
mod run;

use clap::Parser;
use cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use eyre::WrapErr;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

fn init_tracing(cli: &Cli) -> eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .wrap_err("invalid --log-level")?;

    let file_layer = match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("opening log file {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = FILE_GUARD.set(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking),
            )
        }
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    // Console logs go to stderr; stdout is reserved for feedback output.
    if cli.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

fn main() -> std::process::ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporting: {e}");
    }

    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = init_tracing(&cli) {
        eprintln!("{e}");
        return std::process::ExitCode::FAILURE;
    }

    let outcome = match &cli.cmd {
        Commands::Run {
            exercise,
            experts,
            input,
            rate_hz,
            emit_feedback,
        } => run::run(&cli, exercise, experts, input, *rate_hz, *emit_feedback),
        Commands::Check { experts } => run::check(&cli, experts.as_deref()),
    };

    match outcome {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            if JSON_MODE.get().copied().unwrap_or(false) {
                let detail = serde_json::json!({
                    "event": "error",
                    "message": e.to_string(),
                    "explanation": error_fmt::humanize(&e),
                });
                println!("{detail}");
            } else {
                eprintln!("{}", error_fmt::humanize(&e));
            }
            tracing::error!(error = ?e, "run failed");
            std::process::ExitCode::FAILURE
        }
    }
}

//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "coach", version, about = "Exercise repetition evaluation CLI")]
pub struct Cli {
    /// Path to config TOML; built-in exercise table when absent
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Also append logs to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a recorded sample stream against the expert references
    Run {
        /// Exercise to evaluate (must exist in config and expert archive)
        #[arg(long)]
        exercise: String,

        /// Expert archive JSON
        #[arg(long, value_name = "FILE")]
        experts: PathBuf,

        /// JSONL sample recording; "-" reads stdin
        #[arg(long, value_name = "FILE", default_value = "-")]
        input: String,

        /// Nominal sample rate used to derive rep durations (Hz)
        #[arg(long, value_name = "HZ", default_value_t = 20.0)]
        rate_hz: f64,

        /// Print each rep's feedback as a JSON line on stdout
        #[arg(long, action = ArgAction::SetTrue)]
        emit_feedback: bool,
    },
    /// Validate the config and an optional expert archive, then exit
    Check {
        /// Expert archive JSON to shape-check
        #[arg(long, value_name = "FILE")]
        experts: Option<PathBuf>,
    },
}

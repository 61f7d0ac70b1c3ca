//! Human-readable error descriptions for the CLI surface.

use coach_core::{BuildError, EngineError};
use coach_ingest::IngestError;

/// Map an eyre::Report to a human-readable explanation with likely causes
/// and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingReferences => {
                "What happened: No expert references were provided to the engine.\nLikely causes: The expert archive failed to load or was not wired into the builder.\nHow to fix: Pass a valid archive via --experts and check it with `coach check --experts <FILE>`.".to_string()
            }
            BuildError::MissingSink => {
                "What happened: No feedback sink was provided to the engine.\nLikely causes: Internal assembly bug; the CLI always installs one.\nHow to fix: Re-run with --log-level=debug and report the log.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See README for a sample."
            ),
        };
    }

    if let Some(ee) = err.downcast_ref::<EngineError>() {
        return match ee {
            EngineError::Shape { group, expected, got } => format!(
                "What happened: A sample carried {got} angle series for {group}, expected {expected}.\nLikely causes: The recording was made with a different skeleton layout, or a truncated line.\nHow to fix: Re-record with the current capture pipeline or fix the offending line."
            ),
            EngineError::Worker { reference, .. } => format!(
                "What happened: A distance worker failed on expert reference {reference}.\nLikely causes: Task deadline too tight for the trajectory sizes involved.\nHow to fix: Raise evaluation.task_timeout_ms in the config."
            ),
            EngineError::Config(msg) => format!(
                "What happened: {msg}.\nLikely causes: The exercise name does not match the config or expert archive.\nHow to fix: Check spelling against `coach check --experts <FILE>`."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    if let Some(ie) = err.downcast_ref::<IngestError>() {
        return format!(
            "What happened: {ie}.\nLikely causes: The JSONL recording is corrupt or was produced by an incompatible tool.\nHow to fix: Fix or drop the offending line; each line must be one sample object."
        );
    }

    // String-based heuristics for errors coming from loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("reading config") || lower.contains("parsing config") {
        return "What happened: The config TOML could not be loaded.\nLikely causes: Wrong path or a syntax error.\nHow to fix: Check the --config path and validate with `coach check`.".to_string();
    }

    if lower.contains("expert archive") {
        return "What happened: The expert archive could not be loaded.\nLikely causes: Wrong path, invalid JSON, or an archive missing required joint groups.\nHow to fix: Check the --experts path and validate with `coach check --experts <FILE>`.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

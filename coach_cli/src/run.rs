//! Command execution: config/archive loading, engine assembly, and the
//! replay loop.

use crate::cli::Cli;
use coach_core::reference::ReferenceStore;
use coach_core::sink::NullSink;
use coach_core::{Engine, Feedback};
use coach_ingest::JsonlSource;
use coach_traits::SampleSource;
use coach_traits::clock::test_clock::TestClock;
use eyre::WrapErr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn load_config(cli: &Cli) -> eyre::Result<coach_config::Config> {
    let cfg = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("reading config {}", path.display()))?;
            coach_config::load_toml(&text)
                .wrap_err_with(|| format!("parsing config {}", path.display()))?
        }
        None => coach_config::Config::builtin(),
    };
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}

fn open_source(input: &str) -> eyre::Result<Box<dyn SampleSource>> {
    if input == "-" {
        return Ok(Box::new(JsonlSource::new(BufReader::new(
            std::io::stdin(),
        ))));
    }
    let file = File::open(input).wrap_err_with(|| format!("opening input {input}"))?;
    Ok(Box::new(JsonlSource::new(BufReader::new(file))))
}

/// Validate config and archive, report what was found.
pub fn check(cli: &Cli, experts: Option<&Path>) -> eyre::Result<()> {
    let cfg = load_config(cli)?;
    println!("config ok: {} exercises", cfg.exercises.len());
    if let Some(path) = experts {
        let archive = coach_config::load_archive_json(path)
            .wrap_err_with(|| format!("loading expert archive {}", path.display()))?;
        let store = ReferenceStore::from_archive(&archive)?;
        for exercise in store.exercises() {
            let set = store.get(exercise).ok_or_else(|| {
                eyre::eyre!("archive lost exercise {exercise:?} during conversion")
            })?;
            println!(
                "archive ok: {exercise}: {} expert reps ({} good), mean duration {:.2}s",
                set.reps.len(),
                set.good.len(),
                set.mean_duration
            );
        }
    }
    Ok(())
}

/// Replay a recording through the engine and summarize the set.
pub fn run(
    cli: &Cli,
    exercise: &str,
    experts: &Path,
    input: &str,
    rate_hz: f64,
    emit_feedback: bool,
) -> eyre::Result<()> {
    if !(rate_hz.is_finite() && rate_hz > 0.0) {
        eyre::bail!("--rate-hz must be a positive number");
    }
    let cfg = load_config(cli)?;
    let archive = coach_config::load_archive_json(experts)
        .wrap_err_with(|| format!("loading expert archive {}", experts.display()))?;
    let store = ReferenceStore::from_archive(&archive)?;

    // Replay runs on a synthetic time base paced by the nominal sample
    // rate, so rep durations match the recording, not replay speed.
    let clock = TestClock::new();
    let sample_period = Duration::from_secs_f64(1.0 / rate_hz);

    let mut engine = Engine::builder()
        .with_references(store)
        .with_sink(Box::new(NullSink))
        .with_exercises(cfg.exercises)
        .with_detection(cfg.detection)
        .with_evaluation(cfg.evaluation)
        .with_speed(cfg.speed)
        .with_clock(Arc::new(clock.clone()))
        .build()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::SeqCst);
        })
        .wrap_err("installing Ctrl-C handler")?;
    }

    let mut source = open_source(input)?;
    engine.start_new_set(exercise)?;

    let mut samples = 0usize;
    let mut feedback: Vec<Feedback> = Vec::new();
    loop {
        if shutdown.load(Ordering::SeqCst) {
            tracing::info!("interrupted; closing set");
            break;
        }
        let sample = match source.next(Duration::from_millis(100)) {
            Ok(Some(sample)) => sample,
            Ok(None) => break,
            Err(e) => return Err(eyre::eyre!(e)).wrap_err("reading sample stream"),
        };
        clock.advance(sample_period);
        let out = engine
            .ingest(&sample)
            .wrap_err_with(|| format!("sample {samples}"))?;
        samples += 1;
        for fb in out.feedback {
            if emit_feedback {
                println!("{}", serde_json::to_string(&fb)?);
            }
            feedback.push(fb);
        }
    }

    let out = engine.finish_set()?;
    for fb in out.feedback {
        if emit_feedback {
            println!("{}", serde_json::to_string(&fb)?);
        }
        feedback.push(fb);
    }

    let set = engine
        .session()
        .sets()
        .last()
        .ok_or_else(|| eyre::eyre!("no set was recorded"))?;
    let summary = serde_json::json!({
        "event": "summary",
        "exercise": exercise,
        "samples": samples,
        "reps": feedback.len(),
        "skipped_reps": set.skipped_reps,
        "performance": set.performance,
    });
    println!("{summary}");
    Ok(())
}

//! The evaluation engine: sample ingestion, scan cadence, peak
//! acceptance, and rep evaluation hand-off.

use crate::error::{EngineError, Result};
use crate::evaluator;
use crate::model::{Feedback, SeriesRef};
use crate::pool::DistancePool;
use crate::reference::ReferenceStore;
use crate::segment::scan_window;
use crate::session::{Session, SetRecord};
use crate::sink::FeedbackSink;
use crate::validate::refine_candidate;
use coach_config::{DetectionCfg, SpeedCfg};
use coach_traits::RawSample;
use coach_traits::clock::Clock;
use eyre::WrapErr;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// A set with at least this many samples may close a trailing rep at
/// finish time.
const TAIL_MIN_SAMPLES: usize = 10;
/// Minimum gap between the last accepted peak and the set end for the
/// trailing rep to count.
const TAIL_GAP: usize = 20;

/// Engine-resolved exercise definition.
#[derive(Debug, Clone)]
pub struct ExerciseSpec {
    pub segmenting: Vec<SeriesRef>,
    /// Indices into `segmenting` spanned by the amplitude gate.
    pub amplitude_span: Vec<usize>,
    pub threshold1: f64,
    pub threshold2: f64,
}

impl ExerciseSpec {
    pub fn from_cfg(cfg: &coach_config::ExerciseCfg) -> Result<Self, crate::error::BuildError> {
        use crate::error::BuildError;
        if cfg.segmenting.is_empty() {
            return Err(BuildError::InvalidConfig("segmenting series list is empty"));
        }
        if !(cfg.threshold1.is_finite() && cfg.threshold2.is_finite()) {
            return Err(BuildError::InvalidConfig("thresholds must be finite"));
        }
        if cfg.threshold1 <= 0.0 || cfg.threshold1 >= cfg.threshold2 {
            return Err(BuildError::InvalidConfig(
                "threshold1 must be positive and below threshold2",
            ));
        }
        let segmenting: Vec<SeriesRef> = cfg.segmenting.iter().map(|&s| s.into()).collect();
        let amplitude_span = match &cfg.amplitude_span {
            Some(span) => {
                if span.is_empty() {
                    return Err(BuildError::InvalidConfig("amplitude_span must not be empty"));
                }
                for &idx in span {
                    if idx >= segmenting.len() {
                        return Err(BuildError::InvalidConfig(
                            "amplitude_span index out of range",
                        ));
                    }
                }
                span.clone()
            }
            None => (0..segmenting.len()).collect(),
        };
        Ok(Self {
            segmenting,
            amplitude_span,
            threshold1: cfg.threshold1,
            threshold2: cfg.threshold2,
        })
    }
}

/// What one `ingest` call produced.
#[derive(Debug, Default, Clone)]
pub struct IngestOutcome {
    /// Peaks accepted by this call's scan (0 when no scan ran).
    pub accepted_peaks: usize,
    /// Feedback for reps closed and evaluated by this call.
    pub feedback: Vec<Feedback>,
    /// Reps closed by this call whose evaluation failed and was skipped.
    pub skipped_reps: usize,
}

pub struct Engine {
    pub(crate) detection: DetectionCfg,
    pub(crate) speed: SpeedCfg,
    pub(crate) task_timeout: Duration,
    pub(crate) exercises: BTreeMap<String, ExerciseSpec>,
    pub(crate) store: ReferenceStore,
    pub(crate) pool: DistancePool,
    pub(crate) sink: Box<dyn FeedbackSink>,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) session: Session,
}

impl core::fmt::Debug for Engine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("exercises", &self.exercises.keys().collect::<Vec<_>>())
            .field("sets", &self.session.sets().len())
            .field("workers", &self.pool.worker_count())
            .finish()
    }
}

impl Engine {
    /// Start building an Engine.
    pub fn builder() -> crate::builder::EngineBuilder<crate::builder::Missing, crate::builder::Missing>
    {
        crate::builder::EngineBuilder::default()
    }

    /// Begin a new exercise attempt. The previous set, if still open, is
    /// sealed first.
    pub fn start_new_set(&mut self, exercise: &str) -> Result<()> {
        if !self.exercises.contains_key(exercise) {
            return Err(eyre::Report::new(EngineError::Config(format!(
                "unknown exercise {exercise:?}"
            ))));
        }
        if self.store.get(exercise).is_none() {
            return Err(eyre::Report::new(EngineError::Config(format!(
                "no expert references loaded for {exercise:?}"
            ))));
        }
        if let Some(open) = self.session.current_mut()
            && !open.is_sealed()
        {
            open.seal();
        }
        tracing::info!(exercise, "set start");
        self.session
            .push_set(SetRecord::new(exercise.to_string(), self.clock.now()));
        Ok(())
    }

    /// Read-only view of the session history.
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn current_set(&self) -> Result<&SetRecord, EngineError> {
        self.session
            .current()
            .filter(|s| !s.is_sealed())
            .ok_or_else(|| EngineError::State("no active set; call start_new_set first".into()))
    }

    fn current_set_mut(&mut self) -> Result<&mut SetRecord, EngineError> {
        self.session
            .current_mut()
            .filter(|s| !s.is_sealed())
            .ok_or_else(|| EngineError::State("no active set; call start_new_set first".into()))
    }

    /// Ingest one sample: append, timestamp, and on the scan cadence look
    /// for new repetition boundaries. A shape mismatch rejects the sample
    /// without touching accumulated state; a failed rep evaluation is
    /// logged and skipped, never fatal.
    pub fn ingest(&mut self, sample: &RawSample) -> Result<IngestOutcome> {
        let epoch = self.current_set().map_err(eyre::Report::new)?.epoch;
        let t = self.clock.secs_since(epoch);
        {
            let set = self.current_set_mut().map_err(eyre::Report::new)?;
            set.buffer
                .append(sample)
                .map_err(eyre::Report::new)
                .wrap_err("ingesting sample")?;
            set.times.push(t);
        }

        let mut outcome = IngestOutcome::default();
        let (len, stride, floor) = {
            let set = self.current_set().map_err(eyre::Report::new)?;
            (
                set.buffer.len(),
                self.detection.scan_stride,
                self.detection.min_samples,
            )
        };
        if len % stride == 0 && len > floor {
            self.scan_and_evaluate(&mut outcome)?;
        }
        Ok(outcome)
    }

    /// Close the current set. When the tail of the stream holds an
    /// unterminated rep (enough samples past the last accepted peak), the
    /// final sample closes it and the rep is evaluated before sealing.
    pub fn finish_set(&mut self) -> Result<IngestOutcome> {
        let mut outcome = IngestOutcome::default();
        let (exercise, tail_rep) = {
            let set = self.current_set().map_err(eyre::Report::new)?;
            let len = set.buffer.len();
            let tail = match set.last_peak() {
                Some(last) if len > TAIL_MIN_SAMPLES && last + TAIL_GAP < len => {
                    Some((last, len - 1))
                }
                _ => None,
            };
            (set.exercise.clone(), tail)
        };
        if let Some((start, stop)) = tail_rep {
            let set = self.current_set_mut().map_err(eyre::Report::new)?;
            if set.push_peak(stop) {
                outcome.accepted_peaks += 1;
                self.evaluate_closed_rep(&exercise, start, stop, &mut outcome)?;
            }
        }
        let set = self.current_set_mut().map_err(eyre::Report::new)?;
        set.seal();
        tracing::info!(
            exercise,
            reps = set.feedback.len(),
            skipped = set.skipped_reps,
            "set finished"
        );
        Ok(outcome)
    }

    fn scan_and_evaluate(&mut self, outcome: &mut IngestOutcome) -> Result<()> {
        let exercise = self.current_set().map_err(eyre::Report::new)?.exercise.clone();
        let spec = self
            .exercises
            .get(&exercise)
            .cloned()
            .ok_or_else(|| eyre::Report::new(EngineError::State(format!(
                "exercise {exercise:?} vanished from the table"
            ))))?;

        let scan = {
            let set = self.current_set().map_err(eyre::Report::new)?;
            scan_window(&set.buffer, &self.detection, &spec.segmenting)
        };

        for &candidate in &scan.candidates {
            let last = self.current_set().map_err(eyre::Report::new)?.last_peak();
            let Some(refined) = refine_candidate(
                &scan,
                &self.detection,
                &spec.segmenting,
                &spec.amplitude_span,
                candidate,
                last,
            ) else {
                continue;
            };
            let set = self.current_set_mut().map_err(eyre::Report::new)?;
            if !set.push_peak(refined) {
                continue;
            }
            outcome.accepted_peaks += 1;
            tracing::info!(peak = refined, exercise, "peak accepted");

            let n = set.peaks.len();
            if n > 1 {
                let start = set.peaks[n - 2];
                self.evaluate_closed_rep(&exercise, start, refined, outcome)?;
            }
        }
        Ok(())
    }

    fn evaluate_closed_rep(
        &mut self,
        exercise: &str,
        start: usize,
        stop: usize,
        outcome: &mut IngestOutcome,
    ) -> Result<()> {
        let spec = self
            .exercises
            .get(exercise)
            .cloned()
            .ok_or_else(|| eyre::Report::new(EngineError::State(format!(
                "exercise {exercise:?} vanished from the table"
            ))))?;
        let refs = self
            .store
            .get(exercise)
            .cloned()
            .ok_or_else(|| eyre::Report::new(EngineError::State(format!(
                "references for {exercise:?} vanished from the store"
            ))))?;

        let verdict = {
            let set = self.current_set().map_err(eyre::Report::new)?;
            let duration = set.times[stop] - set.times[start];
            evaluator::evaluate_rep(
                set,
                &refs,
                spec.threshold1,
                spec.threshold2,
                &self.speed,
                &self.pool,
                self.task_timeout,
                start,
                stop,
                duration,
            )
        };
        match verdict {
            Ok(feedback) => {
                let set = self.current_set_mut().map_err(eyre::Report::new)?;
                set.feedback.push(feedback.clone());
                set.performance.push(feedback.score_row());
                if let Some(history) = self.session.current().map(|s| s.feedback.as_slice()) {
                    self.sink.react(history, exercise);
                }
                outcome.feedback.push(feedback);
            }
            Err(e) => {
                tracing::warn!(error = %e, start, stop, "rep evaluation failed; skipping");
                let set = self.current_set_mut().map_err(eyre::Report::new)?;
                set.skipped_reps += 1;
                outcome.skipped_reps += 1;
            }
        }
        Ok(())
    }
}

//! Type-state builder for [`Engine`]. Expert references and a feedback
//! sink are mandatory; `build()` only exists once both were provided.

use crate::engine::{Engine, ExerciseSpec};
use crate::error::BuildError;
use crate::pool::{DistancePool, resolve_workers};
use crate::reference::ReferenceStore;
use crate::session::Session;
use crate::sink::FeedbackSink;
use coach_config::{DetectionCfg, EvaluationCfg, ExerciseCfg, SpeedCfg};
use coach_traits::clock::{Clock, MonotonicClock};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

pub struct Missing;
pub struct Set;

/// Builder with two type-state slots: `R` tracks the reference store,
/// `K` tracks the sink.
pub struct EngineBuilder<R, K> {
    store: Option<ReferenceStore>,
    sink: Option<Box<dyn FeedbackSink>>,
    exercises: Option<BTreeMap<String, ExerciseCfg>>,
    detection: DetectionCfg,
    evaluation: EvaluationCfg,
    speed: SpeedCfg,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    _r: PhantomData<R>,
    _k: PhantomData<K>,
}

impl Default for EngineBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            store: None,
            sink: None,
            exercises: None,
            detection: DetectionCfg::default(),
            evaluation: EvaluationCfg::default(),
            speed: SpeedCfg::default(),
            clock: None,
            _r: PhantomData,
            _k: PhantomData,
        }
    }
}

impl EngineBuilder<Missing, Missing> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R, K> EngineBuilder<R, K> {
    /// Provide the expert reference store. Mandatory.
    pub fn with_references(self, store: ReferenceStore) -> EngineBuilder<Set, K> {
        EngineBuilder {
            store: Some(store),
            sink: self.sink,
            exercises: self.exercises,
            detection: self.detection,
            evaluation: self.evaluation,
            speed: self.speed,
            clock: self.clock,
            _r: PhantomData,
            _k: PhantomData,
        }
    }

    /// Provide the feedback sink. Mandatory.
    pub fn with_sink(self, sink: Box<dyn FeedbackSink>) -> EngineBuilder<R, Set> {
        EngineBuilder {
            store: self.store,
            sink: Some(sink),
            exercises: self.exercises,
            detection: self.detection,
            evaluation: self.evaluation,
            speed: self.speed,
            clock: self.clock,
            _r: PhantomData,
            _k: PhantomData,
        }
    }

    /// Exercise table; defaults to the built-in config when omitted.
    pub fn with_exercises(mut self, exercises: BTreeMap<String, ExerciseCfg>) -> Self {
        self.exercises = Some(exercises);
        self
    }

    pub fn with_detection(mut self, detection: DetectionCfg) -> Self {
        self.detection = detection;
        self
    }

    pub fn with_evaluation(mut self, evaluation: EvaluationCfg) -> Self {
        self.evaluation = evaluation;
        self
    }

    pub fn with_speed(mut self, speed: SpeedCfg) -> Self {
        self.speed = speed;
        self
    }

    /// Override the clock (tests inject a deterministic one here).
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Fallible build available in any state; missing mandatory parts
    /// surface as typed errors.
    pub fn try_build(self) -> crate::error::Result<Engine> {
        let store = self.store.ok_or(BuildError::MissingReferences)?;
        let sink = self.sink.ok_or(BuildError::MissingSink)?;

        if self.detection.scan_stride == 0 {
            return Err(BuildError::InvalidConfig("scan_stride must be nonzero").into());
        }
        if self.detection.window == 0 {
            return Err(BuildError::InvalidConfig("window must be nonzero").into());
        }
        if self.evaluation.task_timeout_ms == 0 {
            return Err(BuildError::InvalidConfig("task_timeout_ms must be nonzero").into());
        }

        let cfgs = self
            .exercises
            .unwrap_or_else(|| coach_config::Config::builtin().exercises);
        let mut exercises = BTreeMap::new();
        for (name, cfg) in &cfgs {
            let spec = ExerciseSpec::from_cfg(cfg)?;
            exercises.insert(name.clone(), spec);
        }
        if exercises.is_empty() {
            return Err(BuildError::InvalidConfig("no exercises configured").into());
        }

        let pool = DistancePool::new(resolve_workers(self.evaluation.workers));
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));

        Ok(Engine {
            detection: self.detection,
            speed: self.speed,
            task_timeout: Duration::from_millis(self.evaluation.task_timeout_ms),
            exercises,
            store,
            pool,
            sink,
            clock,
            session: Session::new(),
        })
    }
}

impl EngineBuilder<Set, Set> {
    /// Build once both mandatory parts are present.
    pub fn build(self) -> crate::error::Result<Engine> {
        self.try_build()
    }
}

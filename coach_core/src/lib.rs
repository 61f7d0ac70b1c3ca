#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core repetition evaluation logic (sensor-agnostic).
//!
//! This crate turns a stream of joint-angle samples into per-repetition
//! feedback. Samples arrive through `coach_traits::SampleSource`; everything
//! downstream is pure computation plus a small worker pool.
//!
//! ## Architecture
//!
//! - **Buffering**: lockstep per-group angle storage (`buffer` module)
//! - **Segmentation**: gradient peaks over a trailing window (`segment` module)
//! - **Validation**: candidate gates and refinement (`validate` module)
//! - **Comparison**: elastic distance to expert reps (`dtw`, `pool` modules)
//! - **Scoring**: threshold classification and tempo bands (`evaluator` module)
//! - **Orchestration**: `Engine` with a type-state builder (`engine`, `builder`)

pub mod buffer;
pub mod builder;
pub mod dtw;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod pool;
pub mod reference;
pub mod segment;
pub mod session;
pub mod sink;
pub mod validate;

pub use buffer::AngleBuffer;
pub use builder::EngineBuilder;
pub use engine::{Engine, ExerciseSpec, IngestOutcome};
pub use error::{BuildError, EngineError, Report, Result};
pub use model::{AngleSeries, Feedback, JointGroup, Plane, SeriesRef, Speed};
pub use pool::DistancePool;
pub use reference::{ExpertRep, ReferenceSet, ReferenceStore};
pub use session::{Session, SetRecord};
pub use sink::{FeedbackSink, LoggingSink, NullSink};

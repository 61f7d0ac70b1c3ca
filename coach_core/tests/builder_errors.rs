//! Builder validation: mandatory parts and config sanity.

use std::collections::BTreeMap;
use std::sync::Arc;

use coach_config::{EvaluationCfg, ExerciseCfg, GroupName, PlaneName, SeriesSel};
use coach_core::reference::{ExpertRep, ReferenceSet, ReferenceStore};
use coach_core::{BuildError, Engine, NullSink};

fn tiny_store() -> ReferenceStore {
    let rows = vec![[30.0f32; 3]; 8];
    let rep = Arc::new(ExpertRep::new(
        "Good 1".to_string(),
        4.0,
        [rows.clone(), rows.clone(), rows.clone(), rows],
    ));
    let set = ReferenceSet::new(vec![rep]).expect("reference set");
    ReferenceStore::from_sets([("bicep_curls".to_string(), set)])
}

#[test]
fn try_build_without_references_fails() {
    let err = Engine::builder()
        .with_sink(Box::new(NullSink))
        .try_build()
        .expect_err("references are mandatory");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingReferences)
    ));
}

#[test]
fn try_build_without_sink_fails() {
    let err = Engine::builder()
        .with_references(tiny_store())
        .try_build()
        .expect_err("sink is mandatory");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingSink)
    ));
}

#[test]
fn inverted_thresholds_are_rejected() {
    let mut exercises = BTreeMap::new();
    exercises.insert(
        "bicep_curls".to_string(),
        ExerciseCfg {
            segmenting: vec![SeriesSel {
                group: GroupName::RightShoulder,
                plane: PlaneName::Xz,
            }],
            amplitude_span: None,
            threshold1: 2000.0,
            threshold2: 1500.0,
        },
    );
    let err = Engine::builder()
        .with_references(tiny_store())
        .with_sink(Box::new(NullSink))
        .with_exercises(exercises)
        .build()
        .expect_err("threshold order");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[test]
fn amplitude_span_out_of_range_is_rejected() {
    let mut exercises = BTreeMap::new();
    exercises.insert(
        "bicep_curls".to_string(),
        ExerciseCfg {
            segmenting: vec![SeriesSel {
                group: GroupName::RightShoulder,
                plane: PlaneName::Xz,
            }],
            amplitude_span: Some(vec![3]),
            threshold1: 1500.0,
            threshold2: 2000.0,
        },
    );
    let err = Engine::builder()
        .with_references(tiny_store())
        .with_sink(Box::new(NullSink))
        .with_exercises(exercises)
        .build()
        .expect_err("span index past segmenting table");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[test]
fn zero_worker_timeout_is_rejected() {
    let err = Engine::builder()
        .with_references(tiny_store())
        .with_sink(Box::new(NullSink))
        .with_evaluation(EvaluationCfg {
            workers: 0,
            task_timeout_ms: 0,
        })
        .build()
        .expect_err("timeout must be nonzero");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[test]
fn defaults_build_a_working_engine() {
    let engine = Engine::builder()
        .with_references(tiny_store())
        .with_sink(Box::new(NullSink))
        .build()
        .expect("defaults are valid");
    assert!(engine.session().sets().is_empty());
}

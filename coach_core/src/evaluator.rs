//! Repetition scoring against the expert references.
//!
//! Each closed rep is compared per joint group to every expert rep via
//! elastic distance; thresholding on the best match yields the correction
//! label and the {-1, 0, 1} evaluation score.

use crate::error::EngineError;
use crate::model::{Feedback, JointGroup, Speed};
use crate::pool::DistancePool;
use crate::reference::ReferenceSet;
use crate::session::SetRecord;
use coach_config::SpeedCfg;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Classification outcome for one joint group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupVerdict {
    pub correction: String,
    pub score: i8,
}

/// Map a best distance and its closest expert label onto the correction
/// text and score. `threshold1 < threshold2`; a distance exactly at
/// `threshold1` falls into the borderline band.
pub fn classify_distance(
    best_distance: f64,
    closest_label: &str,
    threshold1: f64,
    threshold2: f64,
) -> GroupVerdict {
    let good = closest_label.contains("Good");
    if best_distance < threshold1 {
        GroupVerdict {
            correction: closest_label.to_string(),
            score: if good { 1 } else { -1 },
        }
    } else if best_distance < threshold2 {
        if good {
            GroupVerdict {
                correction: "ok".to_string(),
                score: 0,
            }
        } else {
            GroupVerdict {
                correction: "bad".to_string(),
                score: -1,
            }
        }
    } else {
        GroupVerdict {
            correction: "bad".to_string(),
            score: -1,
        }
    }
}

/// Exercise-wide tempo classification against the mean expert duration.
/// Durations at or above `slow_cutoff_s` never classify as slow, even when
/// they exceed the tolerance band.
pub fn classify_speed(rep_duration: f64, mean_duration: f64, speed: &SpeedCfg) -> Speed {
    if rep_duration < mean_duration - speed.duration_tolerance_s {
        Speed::Fast
    } else if rep_duration > mean_duration + speed.duration_tolerance_s
        && rep_duration < speed.slow_cutoff_s
    {
        Speed::Slow
    } else {
        Speed::Good
    }
}

/// Score the rep spanning buffer rows `start..stop` of `set`.
///
/// The rep is addressed by index bounds into the set's own buffer; only
/// the per-group slices shipped to the distance workers are materialized.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_rep(
    set: &SetRecord,
    refs: &ReferenceSet,
    threshold1: f64,
    threshold2: f64,
    speed_cfg: &SpeedCfg,
    pool: &DistancePool,
    task_timeout: Duration,
    start: usize,
    stop: usize,
    rep_duration: f64,
) -> Result<Feedback, EngineError> {
    if start >= stop || stop > set.buffer.len() {
        return Err(EngineError::State(format!(
            "rep bounds {start}..{stop} out of range for buffer of {}",
            set.buffer.len()
        )));
    }

    let mut correction = BTreeMap::new();
    let mut evaluation = BTreeMap::new();

    for group in JointGroup::ALL {
        let rep = Arc::new(set.buffer.group_window(group, start, stop));
        let distances = pool.distances(&rep, &refs.reps, group, task_timeout)?;

        let (closest_expert, best_distance) = distances
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(ii, &d)| (ii, d))
            .ok_or_else(|| EngineError::State("no reference distances".into()))?;
        let good_best = refs
            .good
            .iter()
            .map(|&ii| distances[ii])
            .fold(f64::INFINITY, f64::min);
        tracing::info!(
            group = group.as_str(),
            good_min = good_best,
            all_min = best_distance,
            "expert distances"
        );

        let verdict = classify_distance(
            best_distance,
            &refs.reps[closest_expert].label,
            threshold1,
            threshold2,
        );
        correction.insert(
            group,
            format!("{} {}", verdict.correction, group.as_str()),
        );
        evaluation.insert(group, verdict.score);
    }

    let speed = classify_speed(rep_duration, refs.mean_duration, speed_cfg);
    tracing::info!(
        rep_duration,
        mean_expert_duration = refs.mean_duration,
        ?speed,
        "rep timing"
    );

    Ok(Feedback {
        speed,
        correction,
        evaluation,
    })
}

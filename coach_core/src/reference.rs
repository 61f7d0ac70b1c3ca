//! Read-only expert reference store, loaded once at engine start and
//! shared with the distance workers.

use crate::error::EngineError;
use crate::model::{JointGroup, SERIES_PER_GROUP};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One labeled expert repetition.
#[derive(Debug, Clone)]
pub struct ExpertRep {
    pub label: String,
    pub duration: f64,
    trajectories: [Vec<[f32; SERIES_PER_GROUP]>; JointGroup::COUNT],
}

impl ExpertRep {
    pub fn new(
        label: String,
        duration: f64,
        trajectories: [Vec<[f32; SERIES_PER_GROUP]>; JointGroup::COUNT],
    ) -> Self {
        Self {
            label,
            duration,
            trajectories,
        }
    }

    /// Is this the distinguished good-form category?
    #[inline]
    pub fn is_good_form(&self) -> bool {
        self.label.contains("Good")
    }

    #[inline]
    pub fn trajectory(&self, group: JointGroup) -> &[[f32; SERIES_PER_GROUP]] {
        &self.trajectories[group.ordinal()]
    }
}

/// All references for one exercise plus cached statistics.
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    pub reps: Vec<Arc<ExpertRep>>,
    /// Indices of good-form reps within `reps`.
    pub good: Vec<usize>,
    /// Mean expert rep duration (seconds), used for speed classification.
    pub mean_duration: f64,
}

impl ReferenceSet {
    pub fn new(reps: Vec<Arc<ExpertRep>>) -> Result<Self, EngineError> {
        if reps.is_empty() {
            return Err(EngineError::Config(
                "reference set has no expert reps".into(),
            ));
        }
        let good: Vec<usize> = reps
            .iter()
            .enumerate()
            .filter_map(|(ii, rep)| rep.is_good_form().then_some(ii))
            .collect();
        if good.is_empty() {
            return Err(EngineError::Config(
                "reference set has no good-form rep".into(),
            ));
        }
        let mean_duration =
            reps.iter().map(|r| r.duration).sum::<f64>() / reps.len() as f64;
        Ok(Self {
            reps,
            good,
            mean_duration,
        })
    }
}

/// Reference sets keyed by exercise name; immutable after construction.
#[derive(Debug, Default, Clone)]
pub struct ReferenceStore {
    sets: BTreeMap<String, Arc<ReferenceSet>>,
}

impl ReferenceStore {
    /// Convert a shape-checked archive into the engine's reference layout.
    pub fn from_archive(archive: &coach_config::Archive) -> Result<Self, EngineError> {
        let mut sets = BTreeMap::new();
        for (exercise, raw_reps) in archive {
            let mut reps = Vec::with_capacity(raw_reps.len());
            for raw in raw_reps {
                let mut trajectories: [Vec<[f32; SERIES_PER_GROUP]>; JointGroup::COUNT] =
                    Default::default();
                for group in JointGroup::ALL {
                    let name = match group {
                        JointGroup::RightShoulder => coach_config::GroupName::RightShoulder,
                        JointGroup::LeftShoulder => coach_config::GroupName::LeftShoulder,
                        JointGroup::RightElbow => coach_config::GroupName::RightElbow,
                        JointGroup::LeftElbow => coach_config::GroupName::LeftElbow,
                    };
                    let rows = raw.trajectories.get(&name).ok_or_else(|| {
                        EngineError::Config(format!(
                            "archive rep for {exercise:?} misses group {}",
                            group.as_str()
                        ))
                    })?;
                    let mut out = Vec::with_capacity(rows.len());
                    for row in rows {
                        if row.len() != SERIES_PER_GROUP {
                            return Err(EngineError::Shape {
                                group: group.as_str(),
                                expected: SERIES_PER_GROUP,
                                got: row.len(),
                            });
                        }
                        let mut fixed = [0f32; SERIES_PER_GROUP];
                        fixed.copy_from_slice(row);
                        out.push(fixed);
                    }
                    trajectories[group.ordinal()] = out;
                }
                reps.push(Arc::new(ExpertRep::new(
                    raw.label.clone(),
                    raw.duration,
                    trajectories,
                )));
            }
            sets.insert(exercise.clone(), Arc::new(ReferenceSet::new(reps)?));
        }
        Ok(Self { sets })
    }

    /// Build a store directly from in-memory reps (tests, synthetic demos).
    pub fn from_sets(
        sets: impl IntoIterator<Item = (String, ReferenceSet)>,
    ) -> Self {
        Self {
            sets: sets
                .into_iter()
                .map(|(name, set)| (name, Arc::new(set)))
                .collect(),
        }
    }

    #[inline]
    pub fn get(&self, exercise: &str) -> Option<&Arc<ReferenceSet>> {
        self.sets.get(exercise)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn exercises(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }
}

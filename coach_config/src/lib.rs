#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and expert archive loading for the exercise coach.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The expert reference archive is a JSON file keyed by exercise name;
//!   the loader enforces trajectory shapes before the engine ever sees it.
use serde::Deserialize;
use std::collections::BTreeMap;

/// Joint group names as they appear in config and archive files.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GroupName {
    RightShoulder,
    LeftShoulder,
    RightElbow,
    LeftElbow,
}

impl GroupName {
    pub const ALL: [GroupName; 4] = [
        GroupName::RightShoulder,
        GroupName::LeftShoulder,
        GroupName::RightElbow,
        GroupName::LeftElbow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GroupName::RightShoulder => "right_shoulder",
            GroupName::LeftShoulder => "left_shoulder",
            GroupName::RightElbow => "right_elbow",
            GroupName::LeftElbow => "left_elbow",
        }
    }
}

/// 2D projection plane of one angle series.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaneName {
    Xy,
    Yz,
    Xz,
}

/// Names one angle series: a joint group plus its projection plane.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSel {
    pub group: GroupName,
    pub plane: PlaneName,
}

/// Number of angle series tracked per joint group (one per plane).
pub const SERIES_PER_GROUP: usize = 3;

/// Peak detection and validation parameters.
///
/// Defaults match the tuned values of the deployed system; override with
/// care, the amplitude and gradient gates are degree-scale thresholds.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DetectionCfg {
    /// Re-scan the trailing window every this many appended samples.
    pub scan_stride: usize,
    /// No scanning until the set buffer holds more than this many samples.
    pub min_samples: usize,
    /// Trailing window length (samples) bounding each scan.
    pub window: usize,
    /// Minimum gradient peak height for a candidate.
    pub peak_height: f32,
    /// Minimum horizontal separation between candidates (samples).
    pub peak_distance: usize,
    /// Minimum peak prominence for a candidate.
    pub peak_prominence: f32,
    /// Half-width of the refinement window around a candidate (samples).
    pub refine_half_width: usize,
    /// Minimum spacing between accepted peaks (samples).
    pub min_peak_spacing: usize,
    /// Gradient excursion gate: accept only if max grad > +gate or min < -gate.
    pub gradient_gate: f32,
    /// Amplitude gate: minimum observed angle must fall below this (degrees).
    pub amplitude_low: f32,
    /// Amplitude gate: maximum observed angle must exceed this (degrees).
    pub amplitude_high: f32,
}

impl Default for DetectionCfg {
    fn default() -> Self {
        Self {
            scan_stride: 10,
            min_samples: 15,
            window: 500,
            peak_height: 1.5,
            peak_distance: 20,
            peak_prominence: 0.5,
            refine_half_width: 4,
            min_peak_spacing: 15,
            gradient_gate: 5.0,
            amplitude_low: 50.0,
            amplitude_high: 100.0,
        }
    }
}

/// Distance worker pool settings.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct EvaluationCfg {
    /// Worker threads for reference distance tasks; 0 = derived from the
    /// machine (available parallelism, capped at 8).
    pub workers: usize,
    /// Deadline for collecting all distance results of one rep (ms).
    pub task_timeout_ms: u64,
}

impl Default for EvaluationCfg {
    fn default() -> Self {
        Self {
            workers: 0,
            task_timeout_ms: 5_000,
        }
    }
}

/// Speed classification parameters, applied against the archive's mean
/// expert duration (seconds).
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SpeedCfg {
    /// Band half-width around the mean expert duration.
    pub duration_tolerance_s: f64,
    /// Durations at or above this never classify as slow.
    pub slow_cutoff_s: f64,
}

impl Default for SpeedCfg {
    fn default() -> Self {
        Self {
            duration_tolerance_s: 3.0,
            slow_cutoff_s: 7.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// One exercise definition: which series segment reps, which series the
/// amplitude gate spans, and the two classification thresholds.
#[derive(Debug, Deserialize, Clone)]
pub struct ExerciseCfg {
    /// Series used for repetition boundary detection.
    pub segmenting: Vec<SeriesSel>,
    /// Indices into `segmenting` the amplitude gate spans; absent = all.
    #[serde(default)]
    pub amplitude_span: Option<Vec<usize>>,
    /// DTW distance below this => confident classification.
    pub threshold1: f64,
    /// DTW distance below this (but >= threshold1) => borderline ("ok"/"bad").
    pub threshold2: f64,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionCfg,
    pub evaluation: EvaluationCfg,
    pub speed: SpeedCfg,
    pub logging: Logging,
    pub exercises: BTreeMap<String, ExerciseCfg>,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Config preloaded with the two deployed exercises and their tuned
    /// segmenting tables and thresholds.
    pub fn builtin() -> Self {
        use GroupName::*;
        use PlaneName::*;
        let sel = |group, plane| SeriesSel { group, plane };
        let mut exercises = BTreeMap::new();
        exercises.insert(
            "bicep_curls".to_string(),
            ExerciseCfg {
                segmenting: vec![
                    sel(RightShoulder, Xz),
                    sel(LeftShoulder, Xz),
                    sel(RightElbow, Xz),
                    sel(LeftElbow, Xz),
                ],
                // Gate only on the right shoulder / left elbow xz pair.
                amplitude_span: Some(vec![0, 3]),
                threshold1: 1500.0,
                threshold2: 2000.0,
            },
        );
        exercises.insert(
            "lateral_raises".to_string(),
            ExerciseCfg {
                segmenting: vec![
                    sel(RightShoulder, Xy),
                    sel(RightShoulder, Xz),
                    sel(LeftShoulder, Xz),
                    sel(RightElbow, Xz),
                    sel(LeftElbow, Xz),
                ],
                amplitude_span: None,
                threshold1: 1700.0,
                threshold2: 2000.0,
            },
        );
        Self {
            exercises,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // Detection
        if self.detection.scan_stride == 0 {
            eyre::bail!("detection.scan_stride must be >= 1");
        }
        if self.detection.window <= self.detection.min_samples {
            eyre::bail!("detection.window must exceed detection.min_samples");
        }
        if self.detection.peak_distance == 0 {
            eyre::bail!("detection.peak_distance must be >= 1");
        }
        if self.detection.refine_half_width == 0 {
            eyre::bail!("detection.refine_half_width must be >= 1");
        }
        if !self.detection.peak_height.is_finite() || self.detection.peak_height <= 0.0 {
            eyre::bail!("detection.peak_height must be finite and > 0");
        }
        if !self.detection.peak_prominence.is_finite() || self.detection.peak_prominence < 0.0 {
            eyre::bail!("detection.peak_prominence must be finite and >= 0");
        }
        if !self.detection.gradient_gate.is_finite() || self.detection.gradient_gate <= 0.0 {
            eyre::bail!("detection.gradient_gate must be finite and > 0");
        }
        if self.detection.amplitude_low >= self.detection.amplitude_high {
            eyre::bail!("detection.amplitude_low must be below detection.amplitude_high");
        }

        // Evaluation
        if self.evaluation.task_timeout_ms == 0 {
            eyre::bail!("evaluation.task_timeout_ms must be >= 1");
        }

        // Speed
        if !self.speed.duration_tolerance_s.is_finite() || self.speed.duration_tolerance_s < 0.0 {
            eyre::bail!("speed.duration_tolerance_s must be finite and >= 0");
        }
        if !self.speed.slow_cutoff_s.is_finite() || self.speed.slow_cutoff_s <= 0.0 {
            eyre::bail!("speed.slow_cutoff_s must be finite and > 0");
        }

        // Exercises
        if self.exercises.is_empty() {
            eyre::bail!("at least one [exercises.<name>] table is required");
        }
        for (name, ex) in &self.exercises {
            if ex.segmenting.is_empty() {
                eyre::bail!("exercises.{name}: segmenting series list is empty");
            }
            if !(ex.threshold1.is_finite() && ex.threshold2.is_finite()) {
                eyre::bail!("exercises.{name}: thresholds must be finite");
            }
            if ex.threshold1 <= 0.0 {
                eyre::bail!("exercises.{name}: threshold1 must be > 0");
            }
            if ex.threshold1 >= ex.threshold2 {
                eyre::bail!("exercises.{name}: threshold1 must be below threshold2");
            }
            if let Some(span) = &ex.amplitude_span {
                if span.is_empty() {
                    eyre::bail!("exercises.{name}: amplitude_span must not be empty when present");
                }
                for &idx in span {
                    if idx >= ex.segmenting.len() {
                        eyre::bail!(
                            "exercises.{name}: amplitude_span index {idx} out of range (have {} segmenting series)",
                            ex.segmenting.len()
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

/// One labeled expert repetition as stored in the archive file.
#[derive(Debug, Deserialize, Clone)]
pub struct ExpertRepRaw {
    /// Category label; the good-form category contains "Good", every other
    /// label names a specific defect.
    pub label: String,
    /// Rep duration in seconds.
    pub duration: f64,
    /// samples x SERIES_PER_GROUP matrix per joint group.
    pub trajectories: BTreeMap<GroupName, Vec<Vec<f32>>>,
}

/// Expert reference archive: labeled reps keyed by exercise name.
pub type Archive = BTreeMap<String, Vec<ExpertRepRaw>>;

/// Parse and shape-check an archive from JSON text.
///
/// Every rep must carry all four joint groups, each trajectory at least
/// two rows of exactly `SERIES_PER_GROUP` finite values, and every
/// exercise needs at least one good-form rep to classify against.
pub fn parse_archive_json(s: &str) -> eyre::Result<Archive> {
    let archive: Archive =
        serde_json::from_str(s).map_err(|e| eyre::eyre!("malformed expert archive: {e}"))?;

    for (exercise, reps) in &archive {
        if reps.is_empty() {
            eyre::bail!("expert archive: exercise {exercise:?} has no reference reps");
        }
        let mut has_good = false;
        for (ii, rep) in reps.iter().enumerate() {
            if rep.label.trim().is_empty() {
                eyre::bail!("expert archive: {exercise:?} rep {ii} has an empty label");
            }
            has_good |= rep.label.contains("Good");
            if !(rep.duration.is_finite() && rep.duration > 0.0) {
                eyre::bail!(
                    "expert archive: {exercise:?} rep {ii} has invalid duration {}",
                    rep.duration
                );
            }
            for group in GroupName::ALL {
                let Some(traj) = rep.trajectories.get(&group) else {
                    eyre::bail!(
                        "expert archive: {exercise:?} rep {ii} is missing joint group {}",
                        group.as_str()
                    );
                };
                if traj.len() < 2 {
                    eyre::bail!(
                        "expert archive: {exercise:?} rep {ii} group {} has fewer than 2 samples",
                        group.as_str()
                    );
                }
                for (row_idx, row) in traj.iter().enumerate() {
                    if row.len() != SERIES_PER_GROUP {
                        eyre::bail!(
                            "expert archive: {exercise:?} rep {ii} group {} row {row_idx} has {} values, expected {SERIES_PER_GROUP}",
                            group.as_str(),
                            row.len()
                        );
                    }
                    if row.iter().any(|v| !v.is_finite()) {
                        eyre::bail!(
                            "expert archive: {exercise:?} rep {ii} group {} row {row_idx} contains a non-finite value",
                            group.as_str()
                        );
                    }
                }
            }
        }
        if !has_good {
            eyre::bail!("expert archive: exercise {exercise:?} has no good-form reference");
        }
    }

    Ok(archive)
}

pub fn load_archive_json(path: &std::path::Path) -> eyre::Result<Archive> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("open expert archive {:?}: {}", path, e))?;
    parse_archive_json(&text)
}

//! Fixed data model: joint groups, angle series, and the feedback record.
//!
//! Joint groups are a closed enumeration mapped through a static table to
//! their angle series definitions, so series lookups are exhaustive at
//! compile time instead of going through string-keyed maps.

use serde::Serialize;
use std::collections::BTreeMap;

/// 2D projection plane of an angle series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Xy,
    Yz,
    Xz,
}

impl Plane {
    pub const ALL: [Plane; 3] = [Plane::Xy, Plane::Yz, Plane::Xz];

    #[inline]
    pub fn ordinal(self) -> usize {
        match self {
            Plane::Xy => 0,
            Plane::Yz => 1,
            Plane::Xz => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Plane::Xy => "xy",
            Plane::Yz => "yz",
            Plane::Xz => "xz",
        }
    }
}

/// One scalar angle signal: three anatomical landmarks projected onto a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleSeries {
    pub landmarks: [&'static str; 3],
    pub plane: Plane,
}

/// Number of angle series per joint group (one per projection plane).
pub const SERIES_PER_GROUP: usize = coach_config::SERIES_PER_GROUP;
/// Total series across all joint groups.
pub const TOTAL_SERIES: usize = JointGroup::COUNT * SERIES_PER_GROUP;

/// Anatomical joint tracked by the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum JointGroup {
    RightShoulder,
    LeftShoulder,
    RightElbow,
    LeftElbow,
}

impl JointGroup {
    pub const COUNT: usize = 4;
    pub const ALL: [JointGroup; 4] = [
        JointGroup::RightShoulder,
        JointGroup::LeftShoulder,
        JointGroup::RightElbow,
        JointGroup::LeftElbow,
    ];

    #[inline]
    pub fn ordinal(self) -> usize {
        match self {
            JointGroup::RightShoulder => 0,
            JointGroup::LeftShoulder => 1,
            JointGroup::RightElbow => 2,
            JointGroup::LeftElbow => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JointGroup::RightShoulder => "right_shoulder",
            JointGroup::LeftShoulder => "left_shoulder",
            JointGroup::RightElbow => "right_elbow",
            JointGroup::LeftElbow => "left_elbow",
        }
    }

    /// Static series table: landmark triple per plane, ordered xy, yz, xz.
    pub fn series(self) -> &'static [AngleSeries; SERIES_PER_GROUP] {
        const fn triple(landmarks: [&'static str; 3]) -> [AngleSeries; SERIES_PER_GROUP] {
            [
                AngleSeries {
                    landmarks,
                    plane: Plane::Xy,
                },
                AngleSeries {
                    landmarks,
                    plane: Plane::Yz,
                },
                AngleSeries {
                    landmarks,
                    plane: Plane::Xz,
                },
            ]
        }
        const RIGHT_SHOULDER: [AngleSeries; SERIES_PER_GROUP] =
            triple(["right_hip", "right_shoulder", "right_elbow"]);
        const LEFT_SHOULDER: [AngleSeries; SERIES_PER_GROUP] =
            triple(["left_hip", "left_shoulder", "left_elbow"]);
        const RIGHT_ELBOW: [AngleSeries; SERIES_PER_GROUP] =
            triple(["right_shoulder", "right_elbow", "right_wrist"]);
        const LEFT_ELBOW: [AngleSeries; SERIES_PER_GROUP] =
            triple(["left_shoulder", "left_elbow", "left_wrist"]);
        match self {
            JointGroup::RightShoulder => &RIGHT_SHOULDER,
            JointGroup::LeftShoulder => &LEFT_SHOULDER,
            JointGroup::RightElbow => &RIGHT_ELBOW,
            JointGroup::LeftElbow => &LEFT_ELBOW,
        }
    }
}

impl From<coach_config::GroupName> for JointGroup {
    fn from(g: coach_config::GroupName) -> Self {
        match g {
            coach_config::GroupName::RightShoulder => JointGroup::RightShoulder,
            coach_config::GroupName::LeftShoulder => JointGroup::LeftShoulder,
            coach_config::GroupName::RightElbow => JointGroup::RightElbow,
            coach_config::GroupName::LeftElbow => JointGroup::LeftElbow,
        }
    }
}

impl From<coach_config::PlaneName> for Plane {
    fn from(p: coach_config::PlaneName) -> Self {
        match p {
            coach_config::PlaneName::Xy => Plane::Xy,
            coach_config::PlaneName::Yz => Plane::Yz,
            coach_config::PlaneName::Xz => Plane::Xz,
        }
    }
}

/// Reference to one angle series within the fixed series layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesRef {
    pub group: JointGroup,
    pub plane: Plane,
}

impl SeriesRef {
    /// Position in the flattened series layout (group-major, plane-minor).
    #[inline]
    pub fn flat_index(self) -> usize {
        self.group.ordinal() * SERIES_PER_GROUP + self.plane.ordinal()
    }
}

impl From<coach_config::SeriesSel> for SeriesRef {
    fn from(s: coach_config::SeriesSel) -> Self {
        SeriesRef {
            group: s.group.into(),
            plane: s.plane.into(),
        }
    }
}

/// Rep tempo relative to the expert duration distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Fast,
    Slow,
    Good,
}

/// Per-rep feedback record: exercise-wide speed plus per-joint-group
/// correction text and evaluation score.
///
/// Wire shape (JSON):
/// `{ "speed": "...", "correction": {group: text}, "evaluation": {group: -1|0|1} }`
#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub speed: Speed,
    pub correction: BTreeMap<JointGroup, String>,
    pub evaluation: BTreeMap<JointGroup, i8>,
}

impl Feedback {
    /// Evaluation scores as a row aligned with `JointGroup::ALL`, for the
    /// set's running performance matrix.
    pub fn score_row(&self) -> [i8; JointGroup::COUNT] {
        let mut row = [0i8; JointGroup::COUNT];
        for group in JointGroup::ALL {
            row[group.ordinal()] = self.evaluation.get(&group).copied().unwrap_or(0);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_indices_cover_layout_without_gaps() {
        let mut seen = [false; TOTAL_SERIES];
        for group in JointGroup::ALL {
            for plane in Plane::ALL {
                let idx = SeriesRef { group, plane }.flat_index();
                assert!(!seen[idx], "duplicate flat index {idx}");
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn series_table_matches_group_anatomy() {
        let s = JointGroup::RightElbow.series();
        assert_eq!(s[2].landmarks, ["right_shoulder", "right_elbow", "right_wrist"]);
        assert_eq!(s[2].plane, Plane::Xz);
    }
}

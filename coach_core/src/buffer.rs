//! Per-set accumulating buffer of angle samples.
//!
//! All joint groups advance in lockstep: a sample is either appended to
//! every group's buffer or rejected whole, so the per-group sample counts
//! can never diverge.

use crate::error::EngineError;
use crate::model::{JointGroup, SERIES_PER_GROUP, TOTAL_SERIES};
use coach_traits::RawSample;

/// Append-only angle store for one set, one row per sample per joint group.
#[derive(Debug, Default, Clone)]
pub struct AngleBuffer {
    groups: [Vec<[f32; SERIES_PER_GROUP]>; JointGroup::COUNT],
}

impl AngleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples held (identical for every joint group).
    #[inline]
    pub fn len(&self) -> usize {
        self.groups[0].len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate and append one sample. On a shape mismatch nothing is
    /// written and the buffer stays consistent.
    pub fn append(&mut self, sample: &RawSample) -> Result<(), EngineError> {
        let mut rows = [[0f32; SERIES_PER_GROUP]; JointGroup::COUNT];
        for group in JointGroup::ALL {
            let values = match group {
                JointGroup::RightShoulder => &sample.right_shoulder,
                JointGroup::LeftShoulder => &sample.left_shoulder,
                JointGroup::RightElbow => &sample.right_elbow,
                JointGroup::LeftElbow => &sample.left_elbow,
            };
            if values.len() != SERIES_PER_GROUP {
                return Err(EngineError::Shape {
                    group: group.as_str(),
                    expected: SERIES_PER_GROUP,
                    got: values.len(),
                });
            }
            let row = &mut rows[group.ordinal()];
            row.copy_from_slice(values);
        }
        for group in JointGroup::ALL {
            self.groups[group.ordinal()].push(rows[group.ordinal()]);
        }
        Ok(())
    }

    /// Rows of one joint group (read-only).
    #[inline]
    pub fn group_rows(&self, group: JointGroup) -> &[[f32; SERIES_PER_GROUP]] {
        &self.groups[group.ordinal()]
    }

    /// Materialize one joint group's rows over `start..stop` for shipping
    /// to distance workers.
    pub fn group_window(
        &self,
        group: JointGroup,
        start: usize,
        stop: usize,
    ) -> Vec<[f32; SERIES_PER_GROUP]> {
        self.groups[group.ordinal()][start..stop].to_vec()
    }

    /// The trailing `n` samples (or all, if fewer) as per-series columns in
    /// the flattened series layout, plus the absolute index of the first
    /// returned sample.
    pub fn series_window(&self, n: usize) -> (usize, Vec<Vec<f32>>) {
        let len = self.len();
        let start = len.saturating_sub(n);
        let mut columns = vec![Vec::with_capacity(len - start); TOTAL_SERIES];
        for group in JointGroup::ALL {
            let rows = &self.groups[group.ordinal()];
            let base = group.ordinal() * SERIES_PER_GROUP;
            for row in &rows[start..] {
                for (s, &v) in row.iter().enumerate() {
                    columns[base + s].push(v);
                }
            }
        }
        (start, columns)
    }
}

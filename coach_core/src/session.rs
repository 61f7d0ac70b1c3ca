//! Owned session state: one aggregate per engine holding every started
//! set, replacing the original scattering of parallel per-group arrays.

use crate::buffer::AngleBuffer;
use crate::model::{Feedback, JointGroup};
use std::time::Instant;

/// One started exercise attempt. Exclusively owned by the engine; mutated
/// by every incoming sample and every completed-rep evaluation.
#[derive(Debug)]
pub struct SetRecord {
    pub exercise: String,
    pub buffer: AngleBuffer,
    /// Sample timestamps, seconds since the set epoch, parallel to the buffer.
    pub times: Vec<f64>,
    /// Accepted peak sample indices, strictly increasing.
    pub peaks: Vec<usize>,
    /// Feedback history, one record per evaluated rep.
    pub feedback: Vec<Feedback>,
    /// Running performance matrix: one score row per rep, columns aligned
    /// with `JointGroup::ALL`.
    pub performance: Vec<[i8; JointGroup::COUNT]>,
    /// Reps whose evaluation failed and was skipped.
    pub skipped_reps: usize,
    pub epoch: Instant,
    sealed: bool,
}

impl SetRecord {
    pub fn new(exercise: String, epoch: Instant) -> Self {
        Self {
            exercise,
            buffer: AngleBuffer::new(),
            times: Vec::new(),
            peaks: Vec::new(),
            feedback: Vec::new(),
            performance: Vec::new(),
            skipped_reps: 0,
            epoch,
            sealed: false,
        }
    }

    #[inline]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn last_peak(&self) -> Option<usize> {
        self.peaks.last().copied()
    }

    /// Record an accepted peak; enforces the strictly-increasing invariant.
    pub fn push_peak(&mut self, index: usize) -> bool {
        if self.last_peak().is_some_and(|last| index <= last) {
            return false;
        }
        self.peaks.push(index);
        true
    }
}

/// All sets of one engine run, most recent last.
#[derive(Debug, Default)]
pub struct Session {
    sets: Vec<SetRecord>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_set(&mut self, set: SetRecord) {
        self.sets.push(set);
    }

    pub fn sets(&self) -> &[SetRecord] {
        &self.sets
    }

    pub fn current(&self) -> Option<&SetRecord> {
        self.sets.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut SetRecord> {
        self.sets.last_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peaks_must_strictly_increase() {
        let mut set = SetRecord::new("bicep_curls".into(), Instant::now());
        assert!(set.push_peak(20));
        assert!(set.push_peak(45));
        assert!(!set.push_peak(45));
        assert!(!set.push_peak(30));
        assert_eq!(set.peaks, vec![20, 45]);
    }
}

#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Sample sources feeding the evaluation engine.
//!
//! Real deployments stream skeleton-derived joint angles from a capture
//! pipeline; this crate provides the offline stand-ins: a deterministic
//! synthetic arm for demos and replay of recorded samples.

pub mod error;
pub mod jsonl;

pub use error::IngestError;
pub use jsonl::JsonlSource;

use coach_traits::{RawSample, SampleSource};
use std::time::Duration;

const SERIES_PER_GROUP: usize = 3;

/// Deterministic oscillating arm: rest, a steep lift, a hold, and a slow
/// return, repeating forever. Useful for demos and smoke tests.
#[derive(Debug, Clone)]
pub struct SyntheticArm {
    cycle: Vec<f32>,
    cursor: usize,
}

impl SyntheticArm {
    pub fn new() -> Self {
        let mut cycle = Vec::with_capacity(100);
        cycle.extend(std::iter::repeat_n(30.0f32, 20));
        for step in 1..=6 {
            cycle.push(30.0 + 15.0 * step as f32);
        }
        cycle.extend(std::iter::repeat_n(120.0f32, 30));
        for step in 1..=44 {
            cycle.push(120.0 - 90.0 * step as f32 / 44.0);
        }
        Self { cycle, cursor: 0 }
    }

    /// Number of samples per full repetition cycle.
    pub fn cycle_len(&self) -> usize {
        self.cycle.len()
    }
}

impl Default for SyntheticArm {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for SyntheticArm {
    fn next(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<RawSample>, Box<dyn std::error::Error + Send + Sync>> {
        let v = self.cycle[self.cursor % self.cycle.len()];
        self.cursor = self.cursor.wrapping_add(1);
        Ok(Some(RawSample {
            right_shoulder: vec![v; SERIES_PER_GROUP],
            left_shoulder: vec![v; SERIES_PER_GROUP],
            right_elbow: vec![v; SERIES_PER_GROUP],
            left_elbow: vec![v; SERIES_PER_GROUP],
        }))
    }
}

/// Replays a recorded sample sequence, then reports a clean end of stream.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    samples: std::vec::IntoIter<RawSample>,
    delivered: usize,
}

impl ReplaySource {
    pub fn new(samples: Vec<RawSample>) -> Self {
        Self {
            samples: samples.into_iter(),
            delivered: 0,
        }
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }
}

impl SampleSource for ReplaySource {
    fn next(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<RawSample>, Box<dyn std::error::Error + Send + Sync>> {
        match self.samples.next() {
            Some(sample) => {
                self.delivered += 1;
                Ok(Some(sample))
            }
            None => {
                tracing::debug!(delivered = self.delivered, "replay drained");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_arm_cycles_forever() {
        let mut arm = SyntheticArm::new();
        let n = arm.cycle_len();
        let first = arm.next(Duration::ZERO).unwrap().unwrap();
        for _ in 1..n {
            arm.next(Duration::ZERO).unwrap().unwrap();
        }
        let wrapped = arm.next(Duration::ZERO).unwrap().unwrap();
        assert_eq!(first, wrapped);
    }

    #[test]
    fn synthetic_arm_covers_full_range() {
        let mut arm = SyntheticArm::new();
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for _ in 0..arm.cycle_len() {
            let s = arm.next(Duration::ZERO).unwrap().unwrap();
            lo = lo.min(s.right_shoulder[0]);
            hi = hi.max(s.right_shoulder[0]);
        }
        assert!(lo < 50.0 && hi > 100.0);
    }

    #[test]
    fn replay_ends_cleanly() {
        let samples = vec![RawSample::default(); 3];
        let mut replay = ReplaySource::new(samples);
        for _ in 0..3 {
            assert!(replay.next(Duration::ZERO).unwrap().is_some());
        }
        assert!(replay.next(Duration::ZERO).unwrap().is_none());
        assert!(replay.next(Duration::ZERO).unwrap().is_none());
        assert_eq!(replay.delivered(), 3);
    }
}

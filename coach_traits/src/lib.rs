pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// One incoming measurement: the current angle vector for each tracked
/// joint group. Vector lengths must match the engine's per-group series
/// counts; the engine rejects mismatched samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSample {
    pub right_shoulder: Vec<f32>,
    pub left_shoulder: Vec<f32>,
    pub right_elbow: Vec<f32>,
    pub left_elbow: Vec<f32>,
}

/// Push-style transport seam delivering angle samples to the engine.
///
/// `Ok(None)` signals a clean end of stream (the set should be finished);
/// errors are transient transport faults the caller may retry or abort on.
pub trait SampleSource {
    fn next(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<Option<RawSample>, Box<dyn std::error::Error + Send + Sync>>;
}

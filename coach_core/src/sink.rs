//! Feedback sink seam: downstream coach/robot behavior consumes the
//! cumulative feedback history once per evaluated rep.

use crate::model::Feedback;

pub trait FeedbackSink {
    /// Called after each evaluated rep with the current set's full
    /// feedback history, most recent record last.
    fn react(&mut self, history: &[Feedback], exercise: &str);
}

/// Sink that drops everything; useful when driving the engine purely for
/// its returned feedback records.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FeedbackSink for NullSink {
    fn react(&mut self, _history: &[Feedback], _exercise: &str) {}
}

/// Sink that logs each reaction through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSink;

impl FeedbackSink for LoggingSink {
    fn react(&mut self, history: &[Feedback], exercise: &str) {
        if let Some(last) = history.last() {
            tracing::info!(
                exercise,
                rep = history.len(),
                speed = ?last.speed,
                "feedback"
            );
        }
    }
}

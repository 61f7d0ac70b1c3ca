//! Persistent worker pool for reference distance tasks.
//!
//! One pool lives for the whole engine; each repetition fans out one
//! indexed task per expert reference and joins on all of them with a
//! bounded deadline. Results are reassembled by task index, so completion
//! order never matters.
//!
//! Safety: worker threads are joined when the pool is dropped, preventing
//! thread leaks.

use crate::dtw::dtw_distance;
use crate::error::EngineError;
use crate::model::{JointGroup, SERIES_PER_GROUP};
use crate::reference::ExpertRep;
use crossbeam_channel as xch;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub type Job = Box<dyn FnOnce() -> f64 + Send + 'static>;

struct Task {
    index: usize,
    job: Job,
    reply: xch::Sender<(usize, f64)>,
}

pub struct DistancePool {
    tx: Option<xch::Sender<Task>>,
    workers: Vec<std::thread::JoinHandle<()>>,
}

/// Resolve a configured worker count; 0 means derive from the machine,
/// capped at 8.
pub fn resolve_workers(configured: usize) -> usize {
    if configured > 0 {
        configured
    } else {
        std::thread::available_parallelism()
            .map(|n| n.get().min(8))
            .unwrap_or(2)
    }
}

impl DistancePool {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        let (tx, rx) = xch::unbounded::<Task>();
        let handles = (0..workers)
            .map(|worker| {
                let rx = rx.clone();
                std::thread::spawn(move || {
                    while let Ok(task) = rx.recv() {
                        let Task { index, job, reply } = task;
                        // A panicking job must not take the worker down; the
                        // missing result surfaces as a deadline failure.
                        let outcome =
                            std::panic::catch_unwind(std::panic::AssertUnwindSafe(job));
                        match outcome {
                            Ok(value) => {
                                // Collector gone means the deadline already
                                // expired; nothing left to do.
                                let _ = reply.send((index, value));
                            }
                            Err(_) => {
                                tracing::warn!(worker, index, "distance task panicked");
                            }
                        }
                    }
                    tracing::trace!(worker, "distance worker exiting");
                })
            })
            .collect();
        Self {
            tx: Some(tx),
            workers: handles,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Run indexed jobs and collect every result within `timeout`,
    /// reassembled in submission order.
    pub fn run_indexed(
        &self,
        jobs: Vec<Job>,
        timeout: Duration,
    ) -> Result<Vec<f64>, EngineError> {
        let n = jobs.len();
        if n == 0 {
            return Ok(Vec::new());
        }
        let tx = self.tx.as_ref().ok_or_else(|| EngineError::State(
            "distance pool is shut down".into(),
        ))?;

        let (reply_tx, reply_rx) = xch::bounded::<(usize, f64)>(n);
        for (index, job) in jobs.into_iter().enumerate() {
            tx.send(Task {
                index,
                job,
                reply: reply_tx.clone(),
            })
            .map_err(|_| EngineError::State("distance workers are gone".into()))?;
        }
        drop(reply_tx);

        let deadline = Instant::now() + timeout;
        let mut slots: Vec<Option<f64>> = vec![None; n];
        let mut received = 0usize;
        while received < n {
            match reply_rx.recv_deadline(deadline) {
                Ok((index, value)) => {
                    if slots[index].replace(value).is_none() {
                        received += 1;
                    }
                }
                Err(_) => {
                    let missing = slots.iter().position(Option::is_none).unwrap_or(0);
                    return Err(EngineError::Worker {
                        reference: missing,
                        reason: format!("no result within {} ms", timeout.as_millis()),
                    });
                }
            }
        }
        Ok(slots.into_iter().map(|s| s.unwrap_or(f64::INFINITY)).collect())
    }

    /// Distances from one rep trajectory to every reference, restricted to
    /// `group`, in original reference order.
    pub fn distances(
        &self,
        rep: &Arc<Vec<[f32; SERIES_PER_GROUP]>>,
        refs: &[Arc<ExpertRep>],
        group: JointGroup,
        timeout: Duration,
    ) -> Result<Vec<f64>, EngineError> {
        let jobs: Vec<Job> = refs
            .iter()
            .map(|reference| {
                let rep = Arc::clone(rep);
                let reference = Arc::clone(reference);
                Box::new(move || dtw_distance(&rep, reference.trajectory(group))) as Job
            })
            .collect();
        self.run_indexed(jobs, timeout)
    }
}

impl Drop for DistancePool {
    fn drop(&mut self) {
        // Closing the task channel lets every idle worker observe
        // disconnection and exit.
        self.tx.take();
        for handle in self.workers.drain(..) {
            if let Err(e) = handle.join() {
                tracing::warn!(?e, "distance worker panicked during shutdown");
            }
        }
    }
}

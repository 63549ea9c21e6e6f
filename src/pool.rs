//! Worker pool coordinator: bounded fan-out of download workers.
//!
//! The pool admits at most `capacity` workers at once. [`WorkerPool::submit`]
//! waits for a free slot (FIFO, via a fair semaphore) before spawning, and
//! [`WorkerPool::drain`] is the barrier that returns once every submitted
//! descriptor has produced its outcome.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{Semaphore, broadcast};
use tokio::task::JoinSet;

use crate::error::ObjectError;
use crate::types::{DownloadOutcome, Event, ObjectDescriptor, RunCounters};
use crate::worker::DownloadWorker;

/// Bounded pool of concurrent download workers
pub struct WorkerPool {
    worker: DownloadWorker,
    capacity: usize,
    /// One permit per execution slot; a permit lives as long as its task
    slots: Arc<Semaphore>,
    tasks: JoinSet<DownloadOutcome>,
    counters: Arc<RunCounters>,
    event_tx: broadcast::Sender<Event>,
}

impl WorkerPool {
    /// Create a pool with `capacity` slots (minimum 1)
    pub fn new(
        worker: DownloadWorker,
        capacity: usize,
        counters: Arc<RunCounters>,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        let capacity = capacity.max(1);
        Self {
            worker,
            capacity,
            slots: Arc::new(Semaphore::new(capacity)),
            tasks: JoinSet::new(),
            counters,
            event_tx,
        }
    }

    /// Number of execution slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Workers currently holding a slot
    pub fn in_flight(&self) -> usize {
        self.capacity - self.slots.available_permits()
    }

    /// Submitted descriptors whose outcome has not been collected yet
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Shared outcome counters
    pub fn counters(&self) -> &Arc<RunCounters> {
        &self.counters
    }

    /// Start processing `descriptor`, waiting for a free slot first
    ///
    /// The outcome is counted as soon as the worker finishes; it is handed
    /// back by the next [`drain`](Self::drain).
    pub async fn submit(&mut self, descriptor: ObjectDescriptor) {
        // `slots` is private to the pool and never closed, so acquiring cannot fail
        let Ok(permit) = Arc::clone(&self.slots).acquire_owned().await else {
            unreachable!("worker pool semaphore closed");
        };

        let worker = self.worker.clone();
        let counters = Arc::clone(&self.counters);
        let event_tx = self.event_tx.clone();

        self.tasks.spawn(async move {
            let _permit = permit;
            let outcome = match AssertUnwindSafe(worker.process(&descriptor))
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(panic) => {
                    let reason = panic_message(panic.as_ref());
                    tracing::error!(object = %descriptor.name, reason = %reason, "download worker panicked");
                    DownloadOutcome::Failed(
                        descriptor.name.clone(),
                        ObjectError::Aborted {
                            name: descriptor.name,
                            reason,
                        },
                    )
                }
            };
            record(&counters, &event_tx, &outcome);
            outcome
        });
    }

    /// Wait for every submitted descriptor and return their outcomes
    ///
    /// Outcomes arrive in completion order, not submission order.
    pub async fn drain(&mut self) -> Vec<DownloadOutcome> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                // Task bodies catch their own panics and the set is never
                // aborted, so this only fires if the runtime is shutting down
                Err(e) => tracing::error!(error = %e, "worker task ended without an outcome"),
            }
        }
        outcomes
    }
}

/// Count one outcome and publish the matching event
fn record(counters: &RunCounters, event_tx: &broadcast::Sender<Event>, outcome: &DownloadOutcome) {
    let count = counters.record(outcome);
    let event = match outcome {
        DownloadOutcome::Saved(name) => Event::Saved {
            name: name.clone(),
            total_saved: count,
        },
        DownloadOutcome::Skipped(name) => Event::Skipped { name: name.clone() },
        DownloadOutcome::Failed(name, e) => Event::Failed {
            name: name.clone(),
            error: e.to_string(),
        },
    };
    // No subscribers is fine
    event_tx.send(event).ok();
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

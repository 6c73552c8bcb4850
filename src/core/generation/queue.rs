//! Serialized, spaced request queue for image generation.
//!
//! All image requests in the process route through one queue. Requests
//! execute strictly in enqueue order, and each request starts no sooner
//! than a fixed spacing interval after the previous one finished,
//! success or failure, to respect third-party rate limits. A failed
//! request therefore never blocks the queue beyond that spacing; each
//! request is bounded by its own adapter's timeout handling, not by the
//! queue.
//!
//! The queue is an owned object handed to the orchestrator explicitly.
//! Enqueue order is serialized through an mpsc channel drained by a
//! single worker, which is what makes the spacing guarantee hold for
//! concurrent callers.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Queue counters.
#[derive(Debug, Clone, Default)]
pub struct QueueStats {
    pub submitted: u64,
    pub completed: u64,
}

/// FIFO queue that spaces out request execution.
pub struct RequestQueue {
    tx: mpsc::UnboundedSender<Job>,
    submitted: Arc<AtomicU64>,
    completed: Arc<AtomicU64>,
}

impl RequestQueue {
    /// Create the queue and spawn its worker. Must be called from within
    /// a tokio runtime.
    pub fn new(spacing: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let completed = Arc::new(AtomicU64::new(0));
        let completed_worker = completed.clone();

        tokio::spawn(async move {
            let mut last_finished: Option<Instant> = None;
            while let Some(job) = rx.recv().await {
                if let Some(prev) = last_finished {
                    tokio::time::sleep_until(prev + spacing).await;
                }
                job.await;
                last_finished = Some(Instant::now());
                completed_worker.fetch_add(1, Ordering::Relaxed);
            }
            tracing::debug!("request queue worker shutting down");
        });

        Self {
            tx,
            submitted: Arc::new(AtomicU64::new(0)),
            completed,
        }
    }

    /// Enqueue a task and wait for its eventual result.
    ///
    /// Returns `None` only if the worker is gone (runtime shutdown); live
    /// callers can treat that as "queue unavailable" and degrade.
    pub async fn submit<T, F>(&self, task: F) -> Option<T>
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let result = task.await;
            let _ = done_tx.send(result);
        });

        self.tx.send(job).ok()?;
        self.submitted.fetch_add(1, Ordering::Relaxed);
        done_rx.await.ok()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
        }
    }
}

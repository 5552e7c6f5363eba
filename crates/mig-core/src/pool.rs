//! Bounded worker pool for per-unit jobs
//!
//! Jobs are blocking closures (parsing, templating, file writes) run on the
//! blocking thread pool; a semaphore bounds how many run at once.

use crate::error::PoolError;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};

/// Pool statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Jobs accepted
    pub dispatched: usize,
    /// Jobs that returned
    pub completed: usize,
    /// Jobs that panicked or were cancelled
    pub failed: usize,
    /// Highest number of jobs running at once
    pub peak_active: usize,
}

/// Worker pool for lifecycle management of unit jobs
#[derive(Debug)]
pub struct WorkerPool {
    workers: usize,
    permits: Arc<Semaphore>,
    /// Running jobs by id
    active: DashMap<u64, String>,
    next_id: AtomicU64,
    stats: Mutex<PoolStats>,
}

impl WorkerPool {
    /// Create pool running at most `workers` jobs at once (minimum 1)
    #[must_use]
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            workers,
            permits: Arc::new(Semaphore::new(workers)),
            active: DashMap::new(),
            next_id: AtomicU64::new(0),
            stats: Mutex::new(PoolStats::default()),
        }
    }

    /// Maximum concurrent jobs
    #[inline]
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Currently running jobs
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Run a blocking job once a worker is free
    ///
    /// # Errors
    /// - `PoolError::Closed` if the pool was shut down
    /// - `PoolError::WorkerLost` if the job panicked
    pub async fn run<F, T>(&self, label: impl Into<String>, job: F) -> Result<T, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let label = label.into();
        self.stats.lock().await.dispatched += 1;

        let _permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::Closed)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.active.insert(id, label.clone());
        {
            let mut stats = self.stats.lock().await;
            stats.peak_active = stats.peak_active.max(self.active.len());
        }
        tracing::debug!(job = %label, active = self.active.len(), "worker started");

        let outcome = tokio::task::spawn_blocking(job).await;
        self.active.remove(&id);

        let mut stats = self.stats.lock().await;
        match outcome {
            Ok(value) => {
                stats.completed += 1;
                Ok(value)
            }
            Err(e) => {
                stats.failed += 1;
                tracing::error!(job = %label, error = %e, "worker lost");
                Err(PoolError::WorkerLost {
                    job: label,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Stop accepting jobs; running jobs finish normally
    pub fn shutdown(&self) {
        self.permits.close();
    }

    /// Get pool statistics
    pub async fn stats(&self) -> PoolStats {
        *self.stats.lock().await
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(4)
    }
}

use std::sync::Arc;

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Process-wide cap on concurrently handled events
///
/// One permit per in-flight event, shared by every topic. The permit is an
/// owned RAII guard: dropping it (normally, or while unwinding) returns it.
#[derive(Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    max_workers: usize,
}

impl ConcurrencyLimiter {
    /// `max_workers` is clamped to at least 1 so the loop can always progress
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_workers)),
            max_workers,
        }
    }

    /// Wait until a permit is free
    ///
    /// Fails only if the pool has been closed.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        self.semaphore.clone().acquire_owned().await
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Permits currently held
    pub fn in_flight(&self) -> usize {
        self.max_workers.saturating_sub(self.available())
    }
}

//! Fixed-size pool for running blocking client calls off the async runtime.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Default number of concurrent blocking calls.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Errors raised while dispatching work onto the pool.
#[derive(Debug, Error)]
pub enum BlockingPoolError {
    /// The pool was closed before the job acquired a slot.
    #[error("blocking pool closed")]
    Closed,

    /// The job panicked or was aborted.
    #[error("blocking job failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Bounded gate over Tokio's blocking threads.
///
/// At most `size` jobs run at once. Further jobs wait in FIFO order for a
/// free slot; they are never rejected and carry no deadline.
#[derive(Debug, Clone)]
pub struct BlockingPool {
    slots: Arc<Semaphore>,
    size: usize,
}

impl BlockingPool {
    /// Creates a pool running at most `size` jobs concurrently (minimum one).
    #[must_use]
    pub fn new(size: usize) -> Self {
        let bounded = size.max(1);
        Self {
            slots: Arc::new(Semaphore::new(bounded)),
            size: bounded,
        }
    }

    /// Returns the fixed pool size.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of idle slots.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.slots.available_permits()
    }

    /// Runs `job` on a blocking thread once a slot is free.
    ///
    /// # Errors
    ///
    /// Returns [`BlockingPoolError`] when the pool is closed or the job
    /// panics.
    pub async fn run<F, T>(&self, job: F) -> Result<T, BlockingPoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let slot = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_| BlockingPoolError::Closed)?;
        let output = tokio::task::spawn_blocking(move || {
            let _slot = slot;
            job()
        })
        .await?;
        Ok(output)
    }
}

impl Default for BlockingPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

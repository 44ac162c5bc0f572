//! Coordinator configuration.

use std::time::Duration;

/// Configuration for the transaction worker pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of worker threads.
    pub max_workers: usize,
    /// How long an idle worker waits for work before exiting.
    pub keep_alive: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: 5,
            keep_alive: Duration::from_secs(1),
        }
    }
}

impl PoolConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of worker threads.
    #[must_use]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Sets the idle keep-alive.
    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }
}

/// Configuration for the transaction coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Maximum number of retries after the initial attempt.
    ///
    /// Bounds livelock under sustained contention; exceeding it surfaces
    /// [`crate::TxnError::RetriesExhausted`].
    pub max_retries: u32,
    /// Worker pool sizing.
    pub pool: PoolConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_retries: 25,
            pool: PoolConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry ceiling.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the worker pool configuration.
    #[must_use]
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }
}

//! Bounded elastic worker pool for transaction callbacks.

use crate::config::PoolConfig;
use crate::error::{TxnError, TxnResult};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::{trace, warn};

type Job = Box<dyn FnOnce() + Send>;

/// A bounded, elastic pool of threads for user callbacks.
///
/// Callbacks run here, never on the engine run loop, so a slow or blocking
/// callback cannot stall sync ingestion. Workers are spawned on demand up
/// to `max_workers` and exit after sitting idle for `keep_alive`. The work
/// queue is unbounded: callers are never rejected, which trades rejection
/// for memory under pathological load.
///
/// The pool is an explicitly constructed resource: it is created with its
/// coordinator and shut down when dropped. Work still queued at shutdown
/// is drained by the remaining workers before they exit.
pub struct WorkerPool {
    shared: Arc<PoolShared>,
}

struct PoolShared {
    config: PoolConfig,
    queue: Mutex<PoolQueue>,
    work_ready: Condvar,
}

struct PoolQueue {
    jobs: VecDeque<Job>,
    idle: usize,
    live: usize,
    shutdown: bool,
}

impl WorkerPool {
    /// Creates a pool. No threads are spawned until work arrives.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                config,
                queue: Mutex::new(PoolQueue {
                    jobs: VecDeque::new(),
                    idle: 0,
                    live: 0,
                    shutdown: false,
                }),
                work_ready: Condvar::new(),
            }),
        }
    }

    /// Queues `task` for execution and returns a handle to its result.
    pub fn execute<T, F>(&self, task: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (reply, result) = mpsc::channel();
        let job: Job = Box::new(move || {
            // The submitter may have dropped the handle; that is fine.
            let _ = reply.send(task());
        });

        let mut queue = self.shared.queue.lock();
        queue.jobs.push_back(job);
        if queue.idle == 0 && queue.live < self.shared.config.max_workers {
            queue.live += 1;
            let shared = Arc::clone(&self.shared);
            thread::spawn(move || worker_loop(shared));
        }
        drop(queue);
        self.shared.work_ready.notify_one();

        TaskHandle { result }
    }

    /// Returns the number of worker threads currently alive.
    #[must_use]
    pub fn live_workers(&self) -> usize {
        self.shared.queue.lock().live
    }

    /// Returns the number of jobs waiting for a worker.
    #[must_use]
    pub fn queued_jobs(&self) -> usize {
        self.shared.queue.lock().jobs.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        let mut queue = self.shared.queue.lock();
        queue.shutdown = true;
        drop(queue);
        self.shared.work_ready.notify_all();
    }
}

fn worker_loop(shared: Arc<PoolShared>) {
    trace!("worker started");
    let mut queue = shared.queue.lock();
    loop {
        if let Some(job) = queue.jobs.pop_front() {
            drop(queue);
            if catch_unwind(AssertUnwindSafe(job)).is_err() {
                warn!("transaction callback panicked");
            }
            queue = shared.queue.lock();
            continue;
        }
        if queue.shutdown {
            break;
        }
        queue.idle += 1;
        let timed_out = shared
            .work_ready
            .wait_for(&mut queue, shared.config.keep_alive)
            .timed_out();
        queue.idle -= 1;
        if timed_out && queue.jobs.is_empty() && !queue.shutdown {
            // Idle expiry: give the thread back rather than hold it.
            break;
        }
    }
    queue.live -= 1;
    drop(queue);
    trace!("worker exited");
}

/// Handle to a unit of work queued on the pool.
pub struct TaskHandle<T> {
    result: Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the task completes and returns its result.
    ///
    /// Fails with [`TxnError::TaskLost`] if the task panicked or the pool
    /// was torn down underneath it.
    pub fn join(self) -> TxnResult<T> {
        self.result.recv().map_err(|_| TxnError::TaskLost)
    }
}

//! Rayon-backed worker pool with idle tracking.

use std::any::Any;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tracing::{debug, error};

use super::{Executor, Job};

/// Count of queued-but-unfinished jobs.
#[derive(Default)]
struct Outstanding {
    count: Mutex<usize>,
    idle: Condvar,
}

/// Decrements the outstanding count when a job finishes, including by panic.
struct CompletionGuard(Arc<Outstanding>);

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let mut count = self.0.count.lock();
        *count -= 1;
        if *count == 0 {
            self.0.idle.notify_all();
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}

/// Fixed-size pool shared by decode and dump jobs.
///
/// Dropping the pool waits for all queued jobs, so descriptors captured by
/// in-flight jobs are never released underneath them.
pub struct WorkerPool {
    pool: ThreadPool,
    outstanding: Arc<Outstanding>,
    workers: usize,
}

impl WorkerPool {
    /// Create a pool of `workers` threads (at least one) named `{name} {index}`.
    pub fn new(workers: usize, name: &str) -> Result<Self, ThreadPoolBuildError> {
        let workers = workers.max(1);
        let prefix = name.to_string();

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(move |index| format!("{prefix} {index}"))
            .panic_handler(|payload| {
                error!(panic = panic_message(payload.as_ref()), "Worker job panicked");
            })
            .build()?;

        debug!(workers, name, "Worker pool started");

        Ok(Self {
            pool,
            outstanding: Arc::new(Outstanding::default()),
            workers,
        })
    }

    /// Number of jobs queued or running.
    pub fn outstanding(&self) -> usize {
        *self.outstanding.count.lock()
    }
}

impl Executor for WorkerPool {
    fn execute(&self, job: Job) {
        *self.outstanding.count.lock() += 1;
        let guard = CompletionGuard(Arc::clone(&self.outstanding));
        self.pool.spawn(move || {
            let _guard = guard;
            job();
        });
    }

    fn wait_idle(&self) {
        let mut count = self.outstanding.count.lock();
        while *count > 0 {
            self.outstanding.idle.wait(&mut count);
        }
    }

    fn worker_count(&self) -> usize {
        self.workers
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.wait_idle();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

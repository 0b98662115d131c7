//! Background job execution for decode and dump work.
//!
//! The cache schedules file decoding and texture dumping through the
//! [`Executor`] trait. [`WorkerPool`] is the production implementation;
//! [`InlineExecutor`] runs jobs on the calling thread and backs the cache
//! when a pool cannot be created.

mod pool;

pub(crate) use pool::panic_message;
pub use pool::WorkerPool;

/// A unit of background work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs background jobs for the texture cache.
pub trait Executor: Send + Sync {
    /// Queue a job. Never blocks on the job itself.
    fn execute(&self, job: Job);

    /// Block until every job queued so far has finished.
    fn wait_idle(&self);

    /// Number of threads jobs are spread over.
    fn worker_count(&self) -> usize;
}

/// Executor that runs each job immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) {
        job();
    }

    fn wait_idle(&self) {}

    fn worker_count(&self) -> usize {
        1
    }
}

/// Worker count for the shared pool: hardware threads minus one for the
/// render thread, never fewer than one.
pub fn default_worker_count() -> usize {
    let hardware = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    hardware.max(2) - 1
}

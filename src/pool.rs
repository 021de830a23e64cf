//! The task pool: a fixed set of worker threads over a shared FIFO queue.
//!
//! Worker threads block on the queue and run tasks as they arrive. The piece
//! that sets this pool apart is [`TaskPool::wait_for`]: a thread waiting on
//! a handle executes other queued tasks on its own stack instead of idling,
//! so tasks may submit subtasks and wait for them without deadlocking a
//! fully occupied pool.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::handle::{ResultCell, TaskHandle};
use crate::queue::{PoolState, QueuedTask, TaskQueue};

/// Name used for pools created without an explicit one.
const DEFAULT_POOL_NAME: &str = "taskpool";

/// Snapshot of a pool's lifetime counters, as returned by
/// [`TaskPool::stats`].
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Submissions accepted into the queue.
    pub submitted: u64,
    /// Tasks that ran and fulfilled their cell, captured panics included.
    pub completed: u64,
    /// Tasks whose panic was captured as their outcome.
    pub panicked: u64,
    /// Submissions rejected because the pool was not running.
    pub rejected: u64,
    /// Queued tasks removed by [`TaskPool::cancel_pending`].
    pub cancelled: u64,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    panicked: AtomicU64,
    rejected: AtomicU64,
    cancelled: AtomicU64,
}

/// A bounded worker pool with a reentrant wait primitive.
///
/// Dropping the pool performs a graceful shutdown: remaining queued tasks
/// run to completion, then the workers are joined. Call [`TaskPool::stop`]
/// first to abandon queued work instead.
///
/// # Example
///
/// ```
/// use taskpool::TaskPool;
///
/// let pool = TaskPool::new(2);
/// let handle = pool.submit(|| 40 + 2);
/// assert_eq!(pool.wait_for(handle).unwrap(), 42);
/// ```
pub struct TaskPool {
    queue: Arc<TaskQueue>,
    /// Worker thread handles, drained by `join`.
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
    counters: Arc<Counters>,
    name: String,
}

impl TaskPool {
    /// Create a pool with `workers` threads; `0` means one per CPU.
    pub fn new(workers: usize) -> Self {
        Self::named(workers, DEFAULT_POOL_NAME)
    }

    /// Create a named pool. The name shows up in worker thread names and in
    /// log fields.
    ///
    /// # Panics
    ///
    /// Panics if a worker thread cannot be spawned.
    pub fn named(workers: usize, name: impl Into<String>) -> Self {
        let name = name.into();
        let worker_count = if workers == 0 { num_cpus::get() } else { workers };
        let queue = Arc::new(TaskQueue::new());

        let mut handles = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let queue = Arc::clone(&queue);
            let handle = thread::Builder::new()
                .name(format!("{}-{}", name, id))
                .spawn(move || worker_loop(id, queue))
                .expect("failed to spawn worker thread");
            handles.push(handle);
        }

        tracing::info!(pool = %name, workers = worker_count, "task pool created");

        Self {
            queue,
            workers: Mutex::new(handles),
            worker_count,
            counters: Arc::new(Counters::default()),
            name,
        }
    }

    /// Create a pool from a loaded [`PoolConfig`].
    pub fn from_config(config: &PoolConfig) -> Self {
        Self::named(config.worker_count(), config.name())
    }

    /// Submit a unit of work for execution on the pool.
    ///
    /// The returned handle observes the task's outcome. A panic inside the
    /// task is captured and surfaces as [`PoolError::Panicked`] on the
    /// handle; it never takes a worker down. If the pool is draining or
    /// stopped the submission is rejected and the handle is invalid.
    pub fn submit<T, F>(&self, work: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let cell = Arc::new(ResultCell::new());
        let slot = Arc::clone(&cell);
        let counters = Arc::clone(&self.counters);
        let task: QueuedTask = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(work)).map_err(|payload| {
                let message = panic_message(payload);
                counters.panicked.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(panic = %message, "task panicked");
                PoolError::Panicked(message)
            });
            // Counted before fulfilling, so a waiter that already sees the
            // outcome also sees the count.
            counters.completed.fetch_add(1, Ordering::Relaxed);
            slot.fulfill(outcome);
        });

        // Counted before the push so a completion can never outrun it.
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        if !self.queue.push(task) {
            self.counters.submitted.fetch_sub(1, Ordering::Relaxed);
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(pool = %self.name, "submission rejected, pool not running");
            return TaskHandle::invalid();
        }
        TaskHandle::new(cell)
    }

    /// Wait for `handle`, executing other queued tasks on this thread in
    /// the meantime.
    ///
    /// This is the reentrant wait: because the caller drains the queue while
    /// blocked, a task may submit a subtask and wait for it even when every
    /// worker is busy doing exactly the same thing. With an empty queue the
    /// caller yields between polls rather than parking.
    ///
    /// The handle is consumed. Errors mirror the handle's own reporting:
    /// [`PoolError::Rejected`] for an invalid handle, [`PoolError::Stopped`]
    /// when the pool hard-stops before the outcome arrives (the outcome is
    /// abandoned), [`PoolError::Panicked`] when the task panicked.
    pub fn wait_for<T>(&self, handle: TaskHandle<T>) -> PoolResult<T> {
        if !handle.is_valid() {
            return Err(PoolError::Rejected);
        }
        while !self.is_stopped() {
            // Check fulfillment before taking: a cell that is fulfilled but
            // not takeable had its value moved out earlier.
            let was_fulfilled = handle.is_fulfilled();
            if let Some(outcome) = handle.try_take() {
                return outcome;
            }
            if was_fulfilled {
                return Err(PoolError::Taken);
            }
            match self.queue.try_dequeue() {
                Some(task) => task(),
                None => thread::yield_now(),
            }
        }
        Err(PoolError::Stopped)
    }

    /// Begin a graceful shutdown.
    ///
    /// New submissions are rejected from this point on; tasks already queued
    /// still run. Workers exit once the queue drains. Idempotent, and a
    /// later [`TaskPool::stop`] still escalates to a hard stop.
    pub fn finish(&self) {
        if self.queue.finish() {
            tracing::info!(pool = %self.name, "draining task pool");
        }
    }

    /// Hard-stop the pool.
    ///
    /// New submissions are rejected and queued-but-unstarted tasks are
    /// abandoned: their handles never fulfill. A task already running when
    /// the stop lands finishes normally. Idempotent.
    pub fn stop(&self) {
        if self.queue.stop() {
            tracing::info!(pool = %self.name, "stopping task pool");
        }
    }

    /// Remove every queued-but-unstarted task, returning how many were
    /// removed. Their handles never fulfill. The pool keeps running and
    /// keeps accepting new submissions.
    pub fn cancel_pending(&self) -> usize {
        let removed = self.queue.clear();
        if removed > 0 {
            self.counters
                .cancelled
                .fetch_add(removed as u64, Ordering::Relaxed);
            tracing::debug!(pool = %self.name, removed, "cancelled pending tasks");
        }
        removed
    }

    /// Block until every worker thread has exited.
    ///
    /// Workers only exit after [`TaskPool::finish`] or [`TaskPool::stop`],
    /// so call one of those first. Safe to call from inside a task, even
    /// while another thread is joining: handles are claimed under the lock
    /// but joined with it released, and a worker never joins itself. The
    /// caller that claimed a handle does the waiting for it.
    pub fn join(&self) {
        // Joining with the lock held would strand a task that calls in
        // while its own worker is being joined.
        let claimed: Vec<JoinHandle<()>> = self.workers.lock().unwrap().drain(..).collect();
        let current = thread::current().id();
        for worker in claimed {
            if worker.thread().id() == current {
                continue;
            }
            let _ = worker.join();
        }
        tracing::debug!(pool = %self.name, "worker threads joined");
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PoolState {
        self.queue.state()
    }

    /// Whether the pool has been hard-stopped.
    pub fn is_stopped(&self) -> bool {
        self.queue.is_stopped()
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Number of tasks queued but not yet started.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// The pool's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot the lifetime counters.
    ///
    /// Counters are read one at a time, so a snapshot taken while tasks
    /// are in flight can be momentarily inconsistent with itself. Totals
    /// are exact once the pool is idle or joined.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            panicked: self.counters.panicked.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            cancelled: self.counters.cancelled.load(Ordering::Relaxed),
        }
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.finish();
        self.join();
    }
}

/// Worker thread body: pull tasks until the queue signals shutdown.
fn worker_loop(id: usize, queue: Arc<TaskQueue>) {
    tracing::debug!(worker = id, "worker started");
    while let Some(task) = queue.dequeue() {
        task();
    }
    tracing::debug!(worker = id, "worker stopped");
}

/// Best-effort extraction of a panic payload's message.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

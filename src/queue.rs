//! The shared task queue and pool state machine.
//!
//! One mutex guards both the FIFO of pending tasks and the lifecycle state;
//! one condvar signals pushes and state transitions. Keeping the state under
//! the same lock as the queue is what makes shutdown wake-ups reliable: a
//! worker parked in [`TaskQueue::dequeue`] re-checks the combined predicate
//! on every wake, so a stop can never strand an idle worker.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// Lifecycle state of a pool.
///
/// Transitions are monotonic: `Running -> Draining -> Stopped` or
/// `Running -> Stopped`. There is no way back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolState {
    /// Accepting submissions; idle workers block waiting for work.
    Running,
    /// Graceful shutdown: no new submissions, queued tasks still run.
    Draining,
    /// Hard stop: no new submissions, queued tasks are abandoned.
    Stopped,
}

/// A queued unit of work: runs the submitted closure and fulfills its cell.
pub(crate) type QueuedTask = Box<dyn FnOnce() + Send + 'static>;

pub(crate) struct TaskQueue {
    inner: Mutex<QueueInner>,
    /// Signaled once per push and broadcast on state transitions.
    work_changed: Condvar,
}

struct QueueInner {
    tasks: VecDeque<QueuedTask>,
    state: PoolState,
}

impl TaskQueue {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                tasks: VecDeque::new(),
                state: PoolState::Running,
            }),
            work_changed: Condvar::new(),
        }
    }

    /// Append a task, or reject it when the pool is no longer `Running`.
    pub(crate) fn push(&self, task: QueuedTask) -> bool {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.state != PoolState::Running {
                return false;
            }
            inner.tasks.push_back(task);
        }
        self.work_changed.notify_one();
        true
    }

    /// Blocking dequeue for worker threads.
    ///
    /// Parks while the pool is `Running` and the queue is empty. Returns
    /// `None` once no task will ever be handed out: on a hard stop (even
    /// with tasks still queued) or when `Draining` finds the queue empty.
    pub(crate) fn dequeue(&self) -> Option<QueuedTask> {
        let inner = self.inner.lock().unwrap();
        let mut inner = self
            .work_changed
            .wait_while(inner, |inner| {
                inner.state == PoolState::Running && inner.tasks.is_empty()
            })
            .unwrap();
        if inner.state == PoolState::Stopped {
            return None;
        }
        inner.tasks.pop_front()
    }

    /// Non-blocking dequeue for threads that only help out between polls.
    pub(crate) fn try_dequeue(&self) -> Option<QueuedTask> {
        let mut inner = self.inner.lock().unwrap();
        if inner.state == PoolState::Stopped {
            return None;
        }
        inner.tasks.pop_front()
    }

    /// Drop every queued task. Their result cells stay pending forever.
    pub(crate) fn clear(&self) -> usize {
        let mut inner = self.inner.lock().unwrap();
        let removed = inner.tasks.len();
        inner.tasks.clear();
        removed
    }

    /// `Running -> Draining`. Returns `false` when already past `Running`.
    pub(crate) fn finish(&self) -> bool {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.state != PoolState::Running {
                return false;
            }
            inner.state = PoolState::Draining;
        }
        self.work_changed.notify_all();
        true
    }

    /// Any state `-> Stopped`. Returns `false` when already `Stopped`.
    pub(crate) fn stop(&self) -> bool {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.state == PoolState::Stopped {
                return false;
            }
            inner.state = PoolState::Stopped;
        }
        self.work_changed.notify_all();
        true
    }

    pub(crate) fn state(&self) -> PoolState {
        self.inner.lock().unwrap().state
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.state() == PoolState::Stopped
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().unwrap().tasks.len()
    }
}

//! Task handles and the one-shot result cell behind them.
//!
//! Every accepted submission pairs a queued closure with a [`ResultCell`].
//! The thread that executes the closure fulfills the cell exactly once; the
//! [`TaskHandle`] returned to the submitter observes it. The stored value
//! moves out at most once, but completion itself stays observable for the
//! life of the handle.

use std::fmt;
use std::mem;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::error::{PoolError, PoolResult};

enum CellState<T> {
    /// No outcome yet; the task is queued or running.
    Pending,
    /// Outcome stored, not yet moved out.
    Fulfilled(PoolResult<T>),
    /// Outcome moved out by a consumer.
    Taken,
}

/// One-shot container for a task's outcome.
pub(crate) struct ResultCell<T> {
    state: Mutex<CellState<T>>,
    fulfilled: Condvar,
}

impl<T> ResultCell<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(CellState::Pending),
            fulfilled: Condvar::new(),
        }
    }

    /// Store the outcome and wake blocked waiters.
    ///
    /// Only the first call writes; the cell never goes back to `Pending`.
    pub(crate) fn fulfill(&self, outcome: PoolResult<T>) {
        let mut state = self.state.lock().unwrap();
        if matches!(*state, CellState::Pending) {
            *state = CellState::Fulfilled(outcome);
            drop(state);
            self.fulfilled.notify_all();
        }
    }

    fn is_fulfilled(&self) -> bool {
        !matches!(*self.state.lock().unwrap(), CellState::Pending)
    }

    /// Move the outcome out if it is available.
    fn try_take(&self) -> Option<PoolResult<T>> {
        let mut state = self.state.lock().unwrap();
        match mem::replace(&mut *state, CellState::Taken) {
            CellState::Fulfilled(outcome) => Some(outcome),
            other => {
                *state = other;
                None
            }
        }
    }

    /// Block until fulfilled, then move the outcome out.
    fn wait_take(&self) -> PoolResult<T> {
        let state = self.state.lock().unwrap();
        let mut state = self
            .fulfilled
            .wait_while(state, |s| matches!(s, CellState::Pending))
            .unwrap();
        match mem::replace(&mut *state, CellState::Taken) {
            CellState::Fulfilled(outcome) => outcome,
            _ => Err(PoolError::Taken),
        }
    }

    /// Block until fulfilled or `timeout` elapses. `None` means timed out.
    fn wait_take_timeout(&self, timeout: Duration) -> Option<PoolResult<T>> {
        let state = self.state.lock().unwrap();
        let (mut state, _) = self
            .fulfilled
            .wait_timeout_while(state, timeout, |s| matches!(s, CellState::Pending))
            .unwrap();
        match mem::replace(&mut *state, CellState::Taken) {
            CellState::Fulfilled(outcome) => Some(outcome),
            CellState::Taken => Some(Err(PoolError::Taken)),
            CellState::Pending => {
                *state = CellState::Pending;
                None
            }
        }
    }
}

/// Handle to a submitted task's eventual outcome.
///
/// Returned by `TaskPool::submit`. A handle from a rejected submission is
/// *invalid*: every observation on it reports [`PoolError::Rejected`]
/// immediately instead of hanging.
///
/// The outcome value is taken at most once. After [`Self::try_take`] has
/// moved it out, further waits report [`PoolError::Taken`], while
/// [`Self::is_fulfilled`] keeps answering `true`.
pub struct TaskHandle<T> {
    cell: Option<Arc<ResultCell<T>>>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(cell: Arc<ResultCell<T>>) -> Self {
        Self { cell: Some(cell) }
    }

    /// Create an invalid handle, as returned for a rejected submission.
    pub fn invalid() -> Self {
        Self { cell: None }
    }

    /// Whether the submission behind this handle was accepted.
    pub fn is_valid(&self) -> bool {
        self.cell.is_some()
    }

    /// Non-blocking completion check. Invalid handles report `false`.
    pub fn is_fulfilled(&self) -> bool {
        self.cell.as_ref().map_or(false, |cell| cell.is_fulfilled())
    }

    /// Non-blocking poll: move the outcome out if it is available.
    ///
    /// Returns `Some(Err(PoolError::Rejected))` on an invalid handle so that
    /// poll loops terminate instead of spinning forever.
    pub fn try_take(&self) -> Option<PoolResult<T>> {
        match &self.cell {
            Some(cell) => cell.try_take(),
            None => Some(Err(PoolError::Rejected)),
        }
    }

    /// Block the calling thread until the outcome is available.
    ///
    /// This is a plain sleeping wait; it does not execute other queued work
    /// (use `TaskPool::wait_for` for that). A task abandoned by
    /// `cancel_pending` or a hard stop never fulfills its cell, so this call
    /// can block forever on such a handle; reach for [`Self::wait_timeout`]
    /// when that is a possibility.
    pub fn wait(self) -> PoolResult<T> {
        match self.cell {
            Some(cell) => cell.wait_take(),
            None => Err(PoolError::Rejected),
        }
    }

    /// Block until the outcome is available or `timeout` elapses.
    ///
    /// Returns `None` on timeout; the handle stays usable for later attempts.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<PoolResult<T>> {
        match &self.cell {
            Some(cell) => cell.wait_take_timeout(timeout),
            None => Some(Err(PoolError::Rejected)),
        }
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("valid", &self.is_valid())
            .field("fulfilled", &self.is_fulfilled())
            .finish()
    }
}

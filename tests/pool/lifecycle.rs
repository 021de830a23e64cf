//! Submission, execution and completion behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskpool::{PoolError, TaskPool};

use crate::helpers::{init_tracing, submit_counting_tasks, Blocker};

/// Twenty sleepy tasks on ten workers all complete when every handle is
/// awaited.
#[test]
fn test_all_tasks_finish() {
    init_tracing();
    let pool = TaskPool::new(10);
    let counter = Arc::new(AtomicUsize::new(0));
    let handles = submit_counting_tasks(&pool, &counter, 20, Duration::from_millis(10));

    for handle in handles {
        handle.wait().expect("task should complete");
    }
    assert_eq!(counter.load(Ordering::SeqCst), 20);
}

/// Same workload, awaited through the reentrant wait instead of the plain
/// blocking one.
#[test]
fn test_all_tasks_finish_via_wait_for() {
    init_tracing();
    let pool = TaskPool::new(10);
    let counter = Arc::new(AtomicUsize::new(0));
    let handles = submit_counting_tasks(&pool, &counter, 20, Duration::from_millis(10));

    for handle in handles {
        pool.wait_for(handle).expect("task should complete");
    }
    assert_eq!(counter.load(Ordering::SeqCst), 20);

    let stats = pool.stats();
    assert_eq!(stats.submitted, 20);
    assert_eq!(stats.completed, 20);
}

/// Each handle resolves to its own task's value.
#[test]
fn test_values_propagate() {
    init_tracing();
    let pool = TaskPool::new(4);
    let handles: Vec<_> = (0..16).map(|i| pool.submit(move || i * 3 + 1)).collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(pool.wait_for(handle).unwrap(), i * 3 + 1);
    }
}

/// A single worker starts tasks in submission order. Plain `wait` is used
/// on purpose: the reentrant wait would have this thread execute queued
/// tasks itself and interleave the order.
#[test]
fn test_single_worker_runs_fifo() {
    init_tracing();
    let pool = TaskPool::new(1);
    let log = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let log = Arc::clone(&log);
            pool.submit(move || log.lock().unwrap().push(i))
        })
        .collect();

    for handle in handles {
        handle.wait().unwrap();
    }
    assert_eq!(*log.lock().unwrap(), (0..8).collect::<Vec<_>>());
}

/// Dropping the pool drains the queue before the workers exit.
#[test]
fn test_drop_waits_for_queued_tasks() {
    init_tracing();
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let pool = TaskPool::new(2);
        submit_counting_tasks(&pool, &counter, 12, Duration::from_millis(5));
    }
    assert_eq!(counter.load(Ordering::SeqCst), 12);
}

/// Handle queries report pending while the task has not run yet, and the
/// outcome survives until taken.
#[test]
fn test_handle_observation() {
    init_tracing();
    let pool = TaskPool::new(1);
    let blocker = Blocker::occupy(&pool);

    let victim = pool.submit(|| 7);
    assert!(victim.is_valid());
    assert!(!victim.is_fulfilled());
    assert!(victim.wait_timeout(Duration::from_millis(10)).is_none());

    blocker.release().wait().unwrap();
    assert_eq!(victim.wait().unwrap(), 7);
}

/// The reentrant wait on a handle whose value was already taken reports
/// the taken outcome instead of retrying forever.
#[test]
fn test_wait_for_after_take_reports_taken() {
    init_tracing();
    let pool = TaskPool::new(1);
    let handle = pool.submit(|| 5);
    // FIFO on the single worker: once the blocker's task is running, the
    // value task has already fulfilled.
    let blocker = Blocker::occupy(&pool);

    assert!(matches!(handle.try_take(), Some(Ok(5))));
    assert!(handle.is_fulfilled());
    assert!(matches!(pool.wait_for(handle), Err(PoolError::Taken)));

    blocker.release().wait().unwrap();
}

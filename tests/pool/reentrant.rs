//! Recursive submit-and-wait: the deadlock-avoidance property.
//!
//! Every test here would hang forever on a conventional pool of the same
//! size, because each nesting level parks one worker.

use std::sync::Arc;

use taskpool::TaskPool;

use crate::helpers::{init_tracing, Blocker};

/// Each link submits the next one and waits for it on a pool thread.
fn chain(pool: &Arc<TaskPool>, depth: usize) -> usize {
    if depth == 0 {
        return 0;
    }
    let inner = Arc::clone(pool);
    let handle = pool.submit(move || chain(&inner, depth - 1));
    pool.wait_for(handle).expect("nested task should complete") + 1
}

/// Four nested submit-and-wait levels complete on two workers.
#[test]
fn test_nested_chain_on_two_workers() {
    init_tracing();
    let pool = Arc::new(TaskPool::new(2));
    let outer = Arc::clone(&pool);
    let handle = pool.submit(move || chain(&outer, 3));
    assert_eq!(pool.wait_for(handle).unwrap(), 3);
}

/// A chain much deeper than the pool still completes, even with a single
/// worker: every level runs its child on its own stack.
#[test]
fn test_deep_chain_on_single_worker() {
    init_tracing();
    let pool = Arc::new(TaskPool::new(1));
    let outer = Arc::clone(&pool);
    let handle = pool.submit(move || chain(&outer, 8));
    assert_eq!(pool.wait_for(handle).unwrap(), 8);
}

/// A waiting caller outside the pool executes queued work itself when every
/// worker is occupied: `wait_for` returns while the only worker is still
/// parked inside the blocker.
#[test]
fn test_external_caller_helps_a_full_pool() {
    init_tracing();
    let pool = TaskPool::new(1);
    let blocker = Blocker::occupy(&pool);

    let handle = pool.submit(|| "helped");
    assert_eq!(pool.wait_for(handle).unwrap(), "helped");

    blocker.release().wait().unwrap();
}

/// A parent task fans out subtasks and collects them with the reentrant
/// wait while the pool is smaller than the fan-out.
#[test]
fn test_fan_out_fan_in() {
    init_tracing();
    let pool = Arc::new(TaskPool::new(2));
    let outer = Arc::clone(&pool);

    let parent = pool.submit(move || {
        let children: Vec<_> = (1..=4).map(|i| outer.submit(move || i)).collect();
        children
            .into_iter()
            .map(|child| outer.wait_for(child).unwrap())
            .sum::<i32>()
    });

    assert_eq!(pool.wait_for(parent).unwrap(), 10);
}

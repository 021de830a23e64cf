//! taskpool - a bounded worker pool with a reentrant wait primitive.
//!
//! The pool runs submitted closures on a fixed set of worker threads and
//! hands back a [`TaskHandle`] for each outcome. Its defining property is
//! [`TaskPool::wait_for`]: a thread waiting on a handle executes other
//! queued tasks while it waits, so a fixed-size pool survives recursive
//! submit-and-wait chains deeper than its worker count - the pattern that
//! deadlocks a conventional thread pool.
//!
//! # Features
//!
//! - **FIFO execution**: tasks start in submission order
//! - **Reentrant wait**: waiting threads drain queued work instead of idling
//! - **Dual shutdown**: graceful drain ([`TaskPool::finish`]) or hard stop
//!   ([`TaskPool::stop`]) that abandons queued work
//! - **Panic isolation**: a panicking task fails its own handle, nothing else
//! - **Structured logging**: lifecycle events via `tracing`
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         TaskPool                           │
//! │                                                            │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐                     │
//! │  │ worker0 │  │ worker1 │  │ worker2 │   ...               │
//! │  └────┬────┘  └────┬────┘  └────┬────┘                     │
//! │       │ dequeue    │            │                          │
//! │       ▼            ▼            ▼                          │
//! │  ┌──────────────────────────────────┐    try_dequeue       │
//! │  │        TaskQueue (FIFO)          │◀── wait_for(handle)  │
//! │  └──────────────────▲───────────────┘    (helping thread)  │
//! │                     │ push                                 │
//! │                  submit() ──▶ TaskHandle                   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use taskpool::TaskPool;
//!
//! let pool = TaskPool::new(4);
//! let handle = pool.submit(|| 2 + 2);
//! assert_eq!(pool.wait_for(handle).unwrap(), 4);
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod pool;

mod queue;

pub use config::{ConfigError, PoolConfig};
pub use error::{PoolError, PoolResult};
pub use handle::TaskHandle;
pub use pool::{PoolStats, TaskPool};
pub use queue::PoolState;

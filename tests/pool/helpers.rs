//! Shared helpers for the pool integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Once};
use std::time::Duration;

use taskpool::{TaskHandle, TaskPool};

static TRACING: Once = Once::new();

/// Install a test log subscriber once for the whole test binary.
/// Honors `RUST_LOG`; silent when it is unset.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Submit `count` tasks that each sleep for `delay`, then bump `counter`.
pub fn submit_counting_tasks(
    pool: &TaskPool,
    counter: &Arc<AtomicUsize>,
    count: usize,
    delay: Duration,
) -> Vec<TaskHandle<()>> {
    (0..count)
        .map(|_| {
            let counter = Arc::clone(counter);
            pool.submit(move || {
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                counter.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect()
}

/// A task that parks its worker until released, so tests can line up the
/// queue behind it deterministically.
pub struct Blocker {
    release_tx: mpsc::Sender<()>,
    handle: TaskHandle<()>,
}

impl Blocker {
    /// Submit the blocking task and wait until a worker has entered it.
    pub fn occupy(pool: &TaskPool) -> Self {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let handle = pool.submit(move || {
            entered_tx.send(()).unwrap();
            release_rx.recv().unwrap();
        });
        entered_rx
            .recv()
            .expect("worker never entered the blocking task");
        Self { release_tx, handle }
    }

    /// Let the blocked worker run to completion and observe its outcome.
    pub fn release(self) -> TaskHandle<()> {
        self.release_tx.send(()).expect("blocker already released");
        self.handle
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared single-bit cancellation flag.
///
/// Cloning yields another handle to the same flag. The key watcher is the
/// only writer of `signal` during a cycle; the supervisor is the only
/// caller of `reset`, and only between cycles, once no watcher is alive.
#[derive(Clone, Default)]
pub struct CancelToken {
    signaled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent and callable from any thread.
    pub fn signal(&self) {
        self.signaled.store(true, Ordering::Relaxed);
    }

    pub fn is_signaled(&self) -> bool {
        self.signaled.load(Ordering::Relaxed)
    }

    /// Clear the flag for the next cycle.
    pub fn reset(&self) {
        self.signaled.store(false, Ordering::Relaxed);
    }
}

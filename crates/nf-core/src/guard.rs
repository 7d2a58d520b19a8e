//! Non-blocking reentrancy guard for processing passes.
//!
//! At most one pass holds the guard. A second attempt while a pass is in
//! flight is dropped, not queued. The guard is released when the token is
//! dropped, which also covers unwinding out of a faulted pass.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct ProcessingGuard {
    running: Arc<AtomicBool>,
}

/// Proof that the holder owns the current processing pass.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the token is dropped"]
pub struct PassToken {
    running: Arc<AtomicBool>,
}

impl Drop for PassToken {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

impl ProcessingGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard, or `None` if a pass is already running.
    pub fn try_acquire(&self) -> Option<PassToken> {
        self.running
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| PassToken {
                running: Arc::clone(&self.running),
            })
    }

    /// Run `f` while holding the guard. Returns `None` without calling `f`
    /// if another pass holds it.
    pub fn try_run<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        let _token = self.try_acquire()?;
        Some(f())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

//! Coarse cooperative cancellation for the per-filament loops.
//!
//! Filament counts can reach the thousands; each unit of work is cheap but
//! numerous. The token is polled once per filament, so cancellation latency
//! is bounded by the cost of a single filament, and no partial output is
//! ever written after cancellation is observed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag. Cloning is cheap; all clones observe the same
/// state.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

//! Observable "submission in progress" flag

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared submitting flag. Clones observe the same state, so a view can
/// hold one while the engine awaits the submit future.
#[derive(Debug, Clone, Default)]
pub struct SubmitState {
    flag: Arc<AtomicBool>,
}

impl SubmitState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_submitting(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Raise the flag until the returned guard is dropped
    pub(crate) fn begin(&self) -> SubmitGuard {
        self.flag.store(true, Ordering::Release);
        SubmitGuard {
            flag: Arc::clone(&self.flag),
        }
    }
}

/// Clears the submitting flag on drop, including unwinds and cancelled futures
#[derive(Debug)]
pub(crate) struct SubmitGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

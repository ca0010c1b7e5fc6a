use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag shared between the interactive shell and the
/// batch loops. Every long-running loop checks it at the top of each
/// iteration; the fetch path still persists its accumulator after the flag
/// trips.
#[derive(Debug, Clone, Default)]
pub(crate) struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Clears the flag so the next batch operation starts fresh. An interrupt
    /// only ever spans the operation it arrived in.
    pub(crate) fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

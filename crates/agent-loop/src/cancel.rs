//! Cooperative cancellation shared between the loop and its caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable stop flag. The orchestrator checks it at every step
/// boundary; flipping it never interrupts an action mid-flight.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    stopped: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Clear a previous stop request so the flag can gate a new run.
    pub fn reset(&self) {
        self.stopped.store(false, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_stopped());
        flag.request_stop();
        assert!(other.is_stopped());
        other.reset();
        assert!(!flag.is_stopped());
    }
}

//! Cooperative cancellation for long scans
//!
//! Scans poll an [`AbortSignal`] once per unit of work and give up as soon
//! as it is raised. Raising it never interrupts anything by force; the
//! running scan notices on its next poll.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop request. Clones observe the same flag, so one clone can be
/// handed to whoever may want to cancel while another is polled by the scan.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    flag: Arc<AtomicBool>,
}

impl AbortSignal {
    /// Create a signal that is not raised
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask running scans to stop. Idempotent.
    pub fn request(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Lower the flag before starting new work
    pub fn clear(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }

    /// Has a stop been requested since the last [`clear`](Self::clear)?
    #[inline]
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let signal = AbortSignal::new();
        let handle = signal.clone();
        assert!(!signal.is_requested());

        handle.request();
        handle.request();
        assert!(signal.is_requested());

        signal.clear();
        assert!(!handle.is_requested());
    }

    #[test]
    fn test_request_from_other_thread() {
        let signal = AbortSignal::new();
        let handle = signal.clone();
        std::thread::spawn(move || handle.request())
            .join()
            .unwrap();
        assert!(signal.is_requested());
    }
}

//! External cancellation.
//!
//! The surrounding tool traps signals; the engine only sees a shared flag.
//! Workers poll the token between slices: on observing it they flip the
//! container's exhaustion flag and flood both queues with termination
//! markers, so a cancelled run still joins cleanly and publishes its
//! partial timeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply clonable cancellation flag shared between the host and every
/// worker of a container.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
        // Idempotent.
        other.cancel();
        assert!(token.is_cancelled());
    }
}

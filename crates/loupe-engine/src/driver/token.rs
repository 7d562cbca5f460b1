use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation token for one mount of a driver.
///
/// Clones share the flag. Once cancelled it stays cancelled; a remount gets a
/// fresh token.
#[derive(Debug, Clone, Default)]
pub struct MountToken(Arc<AtomicBool>);

impl MountToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

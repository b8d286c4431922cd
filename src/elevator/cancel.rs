use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/**
 * Cooperative cancellation flag for a request that is waiting for admission.
 *
 * Clones share the same flag. Cancelling has no effect on a request that has
 * already been admitted: once the car is moving the ride runs to completion.
 */
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

//! Cancellation of pacing waits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{self as cbc, RecvTimeoutError};

/// Shared flag that interrupts pacing waits.
///
/// Clones share the same state, so one clone can be handed to another
/// thread (a signal handler, a supervisor) while the session thread waits.
///
/// # Example
///
/// ```
/// use plc_field_link::CancelToken;
/// use std::time::Duration;
///
/// let token = CancelToken::new();
/// token.cancel();
/// assert!(!token.sleep(Duration::from_secs(10)));
/// ```
#[derive(Debug, Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    wake_tx: cbc::Sender<()>,
    wake_rx: cbc::Receiver<()>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = cbc::bounded(1);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            wake_tx,
            wake_rx,
        }
    }

    /// Cancels the token and wakes a waiter, if any.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _ = self.wake_tx.try_send(());
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Waits for `duration` unless cancelled first.
    ///
    /// Returns `true` if the full duration elapsed, `false` if cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return false;
        }
        match self.wake_rx.recv_timeout(duration) {
            Ok(()) => false,
            // Both ends live in `self`, so the channel cannot disconnect.
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                !self.is_cancelled()
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

// ---------------------------------------------------------------------------
// ShutdownSignal — cooperative stop for the scheduler loop
// ---------------------------------------------------------------------------

/// Broadcast-based stop signal.
///
/// The loop registers interest via [`subscribe`](ShutdownSignal::subscribe)
/// and races the returned receiver against its ticker. Any holder of the
/// signal (or a clone) requests termination with
/// [`trigger`](ShutdownSignal::trigger), which never blocks: triggering is
/// idempotent, works from any task, and is a plain no-op once the loop has
/// already exited. A trigger delivered before the loop starts is still
/// observed, through the flag checked on loop entry.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    trigger: broadcast::Sender<()>,
    /// Atomic flag for cheap polling and for triggers that land before any
    /// subscriber exists.
    triggered: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (trigger, _) = broadcast::channel(1);
        Self {
            trigger,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribe to the stop signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.trigger.subscribe()
    }

    /// Check if a stop has been requested (non-blocking).
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Request termination. Safe to call any number of times, from any
    /// task, before, during, or after the loop.
    pub fn trigger(&self) {
        if self
            .triggered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
        {
            debug!("shutdown signal triggered");
            // No receivers is fine: the flag alone stops a loop that has
            // not subscribed yet, and a loop that already exited ignores it.
            let _ = self.trigger.send(());
        } else {
            debug!("shutdown already triggered");
        }
    }

    /// Number of loops currently listening.
    pub fn subscriber_count(&self) -> usize {
        self.trigger.receiver_count()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

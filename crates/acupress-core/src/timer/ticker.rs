//! One-second tick source with an explicit owned handle.
//!
//! A [`TickHandle`] is the only way to receive ticks. Cancelling or dropping
//! it aborts the background task and drops the receiving end, so no tick
//! can reach a caller after the handle is gone.

use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Live periodic tick schedule.
#[derive(Debug)]
pub struct TickHandle {
    rx: mpsc::Receiver<()>,
    task: JoinHandle<()>,
}

impl TickHandle {
    /// Spawn a schedule whose first tick fires one full `period` from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                // At most one tick waits for a stalled consumer; the rest are dropped.
                match tx.try_send(()) {
                    Ok(()) | Err(TrySendError::Full(())) => {}
                    Err(TrySendError::Closed(())) => break,
                }
            }
        });
        Self { rx, task }
    }

    /// Wait for the next tick. Cancel-safe.
    pub async fn next(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Stop the schedule. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

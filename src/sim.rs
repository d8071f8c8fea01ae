//! Delayed drying simulation for wet-media brushes
//!
//! Wet brushes (watercolor, oil) schedule a "drying" transition a short
//! while after the stroke ends. The raster surface is not thread-safe for
//! concurrent writes, so the timer never draws: it only delivers a
//! `DryEvent` on a channel the host drains from its render loop, which
//! then performs the actual repaint. Timers are bounded to the owning
//! session's lifetime and cancelled unconditionally on drop.

use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::geom::Rect;

/// A wet region that has finished drying and should be flattened/repainted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DryEvent {
    /// Surface region covered by the wet marks
    pub region: Rect,
}

/// Factory for drying timers, carrying the runtime handle and the event
/// channel into sessions
#[derive(Debug, Clone)]
pub struct DryingScheduler {
    runtime: tokio::runtime::Handle,
    tx: UnboundedSender<DryEvent>,
}

impl DryingScheduler {
    /// Create a scheduler and the receiver the host render loop drains
    pub fn new(runtime: tokio::runtime::Handle) -> (Self, UnboundedReceiver<DryEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { runtime, tx }, rx)
    }

    /// Schedule a drying transition after `delay`
    pub fn schedule(&self, delay: Duration, event: DryEvent) -> DryingTimer {
        let tx = self.tx.clone();
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver may be gone during host teardown; nothing to do then
            if tx.send(event).is_err() {
                tracing::debug!("drying event dropped, receiver closed");
            }
        });
        DryingTimer { handle }
    }
}

/// A pending drying transition; aborts the underlying task when dropped
#[derive(Debug)]
pub struct DryingTimer {
    handle: JoinHandle<()>,
}

impl DryingTimer {
    /// Cancel the pending transition
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for DryingTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn region() -> Rect {
        Rect::new(0.0, 0.0, 10.0, 10.0)
    }

    #[tokio::test]
    async fn test_event_delivered_after_delay() {
        let (scheduler, mut rx) = DryingScheduler::new(tokio::runtime::Handle::current());
        let timer = scheduler.schedule(Duration::from_millis(10), DryEvent { region: region() });

        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.region, region());
        drop(timer);
    }

    #[tokio::test]
    async fn test_cancel_suppresses_event() {
        let (scheduler, mut rx) = DryingScheduler::new(tokio::runtime::Handle::current());
        let timer = scheduler.schedule(Duration::from_millis(20), DryEvent { region: region() });
        timer.cancel();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_drop_cancels() {
        let (scheduler, mut rx) = DryingScheduler::new(tokio::runtime::Handle::current());
        {
            let _timer =
                scheduler.schedule(Duration::from_millis(20), DryEvent { region: region() });
        }
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(rx.try_recv().is_err());
    }
}

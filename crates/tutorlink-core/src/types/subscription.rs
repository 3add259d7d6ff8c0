//! Live-subscription primitive.
//!
//! A subscription is a standing query against a document store: a
//! background task pushes snapshots onto a bounded channel whenever the
//! underlying data changes. Delivery is at-least-once and the current
//! value is redelivered on every fresh subscribe.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A live subscription delivering snapshots over a bounded channel.
///
/// Dropping the subscription aborts the forwarding task; no further
/// snapshots are delivered after that point.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: mpsc::Receiver<T>,
    task: JoinHandle<()>,
}

impl<T> Subscription<T> {
    /// Create a subscription from its snapshot channel and forwarding task.
    pub fn new(rx: mpsc::Receiver<T>, task: JoinHandle<()>) -> Self {
        Self { rx, task }
    }

    /// Receive the next snapshot. Returns `None` once the subscription
    /// has been cancelled or the publishing side is gone.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Cancel the subscription explicitly.
    pub fn cancel(&mut self) {
        self.task.abort();
        self.rx.close();
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

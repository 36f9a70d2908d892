//! Fan-out of rules-core notices to session subscribers.
//!
//! Every actor queue shares one [`BroadcastNotifier`]. Sessions subscribe
//! and filter for the notices addressed to them.

use artisan_rules::{Notice, Notifier};
use tokio::sync::broadcast;
use tracing::trace;

/// A [`Notifier`] backed by a tokio broadcast channel.
///
/// Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Notice>,
}

impl BroadcastNotifier {
    /// A channel that buffers up to `capacity` notices per lagging
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// A new receiver that sees every notice sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&mut self, notice: Notice) {
        if let Err(broadcast::error::SendError(dropped)) = self.tx.send(notice) {
            trace!(?dropped, "notice dropped, no subscribers");
        }
    }
}

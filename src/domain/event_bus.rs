//! Fan-out of committed ledger changes.
//!
//! Services publish a [`LedgerEvent`] once their transaction has committed;
//! each `/ws` connection holds its own receiver and applies its topic
//! filter locally. Nothing is published for a rolled-back transaction.

use tokio::sync::broadcast;

use super::LedgerEvent;

/// Cloneable handle to the ledger's event stream.
///
/// A receiver that falls more than `capacity` events behind skips the
/// oldest ones; its next `recv` reports how many were lost.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LedgerEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per receiver.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Announces one committed change and returns how many connections got it.
    ///
    /// With nobody listening the event is discarded; the ledger itself
    /// never depends on delivery.
    pub fn publish(&self, event: LedgerEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Announces the changes of one transaction in commit order, e.g. a
    /// redemption followed by the credit it caused.
    pub fn publish_all(&self, events: impl IntoIterator<Item = LedgerEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Opens a receiver for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }
}

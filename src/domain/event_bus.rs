//! Broadcast channel for domain events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Every mutation
//! publishes a [`RewardsEvent`] through the bus and every WebSocket
//! connection subscribes to it.

use tokio::sync::broadcast;

use super::RewardsEvent;

/// Broadcast bus for [`RewardsEvent`]s.
///
/// When the ring buffer is full the oldest events are dropped for lagging
/// receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RewardsEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event and returns how many receivers got it.
    ///
    /// With no receivers the event is silently dropped.
    pub fn publish(&self, event: RewardsEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a receiver for all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RewardsEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

//! Event bus implementation using tokio broadcast channels

use tokio::sync::broadcast;

use crate::types::EventEnvelope;

/// Capacity for the broadcast channel. A workflow run emits a few dozen
/// events per cycle, so this never backpressures in practice.
const DEFAULT_CAPACITY: usize = 1024;

/// Event bus for publishing and subscribing to workflow events.
///
/// Cloning is cheap and every clone publishes into the same channel; the
/// bus closes once all clones are dropped, which is how subscribers learn
/// that a workflow run is over.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event. With no
    /// subscribers the event is dropped and 0 is returned; publishing is
    /// never an error.
    pub fn publish(&self, envelope: EventEnvelope) -> usize {
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

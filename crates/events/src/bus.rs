//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application; every
//! committed lifecycle transition publishes one [`DomainEvent`].

use accord_core::types::DbId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event kinds published by the contract lifecycle.
pub mod kinds {
    pub const CONTRACT_CREATED: &str = "contract.created";
    pub const CONTRACT_SHARED: &str = "contract.shared";
    pub const INVITATION_ACCEPTED: &str = "invitation.accepted";
    pub const COLLABORATOR_REVIEWING: &str = "collaborator.reviewing";
    pub const COLLABORATOR_APPROVED: &str = "collaborator.approved";
    pub const CONTRACT_REJECTED: &str = "contract.rejected";
    pub const CONTRACT_AMENDED: &str = "contract.amended";
    pub const COLLABORATOR_CONFIRMED: &str = "collaborator.confirmed";
    /// Every party passed the confirmation gate; the contract is active.
    pub const CONTRACT_ACTIVATED: &str = "contract.activated";
}

/// A lifecycle transition that other parties should hear about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Dot-separated event name from [`kinds`].
    pub event_type: String,

    /// The contract the transition happened on.
    pub contract_id: DbId,

    /// The user whose action triggered the event.
    pub actor_user_id: DbId,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// Create an event for a transition on `contract_id` triggered by
    /// `actor_user_id`.
    pub fn new(event_type: impl Into<String>, contract_id: DbId, actor_user_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            contract_id,
            actor_user_id,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// notification is best-effort by design.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = DomainEvent::new(kinds::CONTRACT_ACTIVATED, 42, 7)
            .with_payload(serde_json::json!({"collaborators": 2}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "contract.activated");
        assert_eq!(received.contract_id, 42);
        assert_eq!(received.actor_user_id, 7);
        assert_eq!(received.payload["collaborators"], 2);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(DomainEvent::new(kinds::CONTRACT_SHARED, 1, 2));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type, "contract.shared");
        assert_eq!(e2.event_type, "contract.shared");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(DomainEvent::new(kinds::CONTRACT_CREATED, 1, 1));
    }
}

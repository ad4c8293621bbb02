//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Handlers publish a [`DomainEvent`] after each successful write; the
//! snapshot router in the API crate subscribes and pushes fresh collection
//! snapshots to the owner's live connections.

use chrono::{DateTime, Utc};
use sakenote_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Published after a beverage record is created, updated, re-rated or deleted.
pub const BEVERAGE_CHANGED: &str = "beverage.changed";

/// Published when a live connection opens and needs the current collection.
pub const SNAPSHOT_REQUESTED: &str = "snapshot.requested";

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// Something that changed a user's collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Dot-separated event name, e.g. `"beverage.changed"`.
    pub event_type: String,

    /// The user whose collection changed.
    pub owner_id: DbId,

    /// The affected record, if any.
    pub entity_id: Option<DbId>,

    /// What happened (`"created"`, `"updated"`, `"rated"`, `"deleted"`).
    pub action: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(event_type: impl Into<String>, owner_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            owner_id,
            entity_id: None,
            action: None,
            timestamp: Utc::now(),
        }
    }

    /// Shorthand for a [`BEVERAGE_CHANGED`] event.
    pub fn beverage_changed(owner_id: DbId, beverage_id: DbId, action: &str) -> Self {
        Self::new(BEVERAGE_CHANGED, owner_id)
            .with_entity(beverage_id)
            .with_action(action)
    }

    /// Shorthand for a [`SNAPSHOT_REQUESTED`] event.
    pub fn snapshot_requested(owner_id: DbId) -> Self {
        Self::new(SNAPSHOT_REQUESTED, owner_id)
    }

    pub fn with_entity(mut self, entity_id: DbId) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus. Share via `Arc<EventBus>`.
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest messages are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped if nobody is listening.
    pub fn publish(&self, event: DomainEvent) {
        let _ = self.sender.send(event);
    }

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
    async fn subscriber_receives_beverage_change() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::beverage_changed(7, 42, "rated"));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, BEVERAGE_CHANGED);
        assert_eq!(received.owner_id, 7);
        assert_eq!(received.entity_id, Some(42));
        assert_eq!(received.action.as_deref(), Some("rated"));
    }

    #[tokio::test]
    async fn every_subscriber_sees_the_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(DomainEvent::new("beverage.changed", 1));

        assert_eq!(rx1.recv().await.unwrap().owner_id, 1);
        assert_eq!(rx2.recv().await.unwrap().owner_id, 1);
    }

    #[tokio::test]
    async fn snapshot_request_keeps_publish_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::snapshot_requested(3));
        bus.publish(DomainEvent::beverage_changed(3, 9, "created"));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.event_type, SNAPSHOT_REQUESTED);
        assert_eq!(first.entity_id, None);
        assert_eq!(rx.recv().await.unwrap().event_type, BEVERAGE_CHANGED);
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let bus = EventBus::default();
        bus.publish(DomainEvent::new("beverage.changed", 1));
    }

    #[tokio::test]
    async fn slow_receiver_observes_lag() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for id in 0..5 {
            bus.publish(DomainEvent::beverage_changed(1, id, "updated"));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
    }
}

use std::sync::Arc;

use sakenote_vision::LabelAnalyzer;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: sakenote_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub ws_manager: Arc<WsManager>,
    pub event_bus: Arc<sakenote_events::EventBus>,
    /// Label classifier. A stub is injected in tests.
    pub analyzer: Arc<dyn LabelAnalyzer>,
}

impl AppState {
    /// Publish a `beverage.changed` event for live subscribers.
    pub fn notify_beverage_changed(&self, owner_id: i64, beverage_id: i64, action: &str) {
        self.event_bus
            .publish(sakenote_events::DomainEvent::beverage_changed(owner_id, beverage_id, action));
    }

    /// Ask the snapshot router to push the owner's collection. Goes through
    /// the bus so it is ordered with every change notification.
    pub fn request_snapshot(&self, owner_id: i64) {
        self.event_bus
            .publish(sakenote_events::DomainEvent::snapshot_requested(owner_id));
    }
}

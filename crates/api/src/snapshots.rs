//! Pushes full collection snapshots to live subscribers.
//!
//! [`SnapshotRouter`] listens on the event bus; for every
//! `beverage.changed` or `snapshot.requested` event it re-reads the owner's
//! collection and sends the whole list to that owner's WebSocket
//! connections. Clients replace their local copy wholesale. Every frame is
//! produced by this one task in bus order, so the last frame a connection
//! sees reflects the last committed write.

use std::sync::Arc;

use axum::extract::ws::Message;
use sakenote_core::types::DbId;
use sakenote_db::repositories::BeverageRepo;
use sakenote_db::DbPool;
use sakenote_events::{DomainEvent, BEVERAGE_CHANGED, SNAPSHOT_REQUESTED};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::handlers::beverages::to_response;
use crate::ws::WsManager;

/// Wire shape of a snapshot frame.
#[derive(Debug, Serialize)]
pub struct SnapshotFrame<T: Serialize> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: T,
}

/// Build a snapshot frame with the owner's records, newest first.
pub async fn snapshot_message(pool: &DbPool, owner_id: DbId) -> Result<Message, sqlx::Error> {
    let rows = BeverageRepo::list_by_owner(pool, owner_id).await?;
    let frame = SnapshotFrame {
        kind: "snapshot",
        data: rows.iter().map(to_response).collect::<Vec<_>>(),
    };
    let text = serde_json::to_string(&frame).unwrap_or_else(|_| "{}".into());
    Ok(Message::Text(text.into()))
}

pub struct SnapshotRouter {
    pool: DbPool,
    ws_manager: Arc<WsManager>,
}

impl SnapshotRouter {
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>) -> Self {
        Self { pool, ws_manager }
    }

    /// Consume events until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if event.event_type == BEVERAGE_CHANGED
                        || event.event_type == SNAPSHOT_REQUESTED
                    {
                        self.push_logged(event.owner_id).await;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Skipped events may belong to anyone still connected.
                    let owners = self.ws_manager.connected_users().await;
                    tracing::warn!(
                        skipped = n,
                        owners = owners.len(),
                        "Snapshot router lagged, resyncing connected owners"
                    );
                    for owner_id in owners {
                        self.push_logged(owner_id).await;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, snapshot router shutting down");
                    break;
                }
            }
        }
    }

    async fn push_logged(&self, owner_id: DbId) {
        if let Err(e) = self.push_snapshot(owner_id).await {
            tracing::error!(error = %e, owner_id, "Failed to push collection snapshot");
        }
    }

    async fn push_snapshot(&self, owner_id: DbId) -> Result<(), sqlx::Error> {
        if !self.ws_manager.has_user(owner_id).await {
            return Ok(());
        }
        let message = snapshot_message(&self.pool, owner_id).await?;
        let sent = self.ws_manager.send_to_user(owner_id, message).await;
        tracing::debug!(owner_id, connections = sent, "Pushed collection snapshot");
        Ok(())
    }
}

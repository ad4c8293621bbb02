use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use sakenote_core::types::{DbId, Timestamp};
use tokio::sync::{mpsc, RwLock};

pub type WsSender = mpsc::UnboundedSender<Message>;

/// One live subscription.
pub struct WsConnection {
    /// The owner whose collection this connection follows.
    pub user_id: DbId,
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

/// All active WebSocket connections, keyed by connection id.
///
/// Interior `RwLock`; share via `Arc`.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection and return the receiver for its outbound queue.
    pub async fn add(&self, conn_id: String, user_id: DbId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Distinct users with at least one open connection, in id order.
    pub async fn connected_users(&self) -> Vec<DbId> {
        let mut users: Vec<DbId> = self
            .connections
            .read()
            .await
            .values()
            .map(|c| c.user_id)
            .collect();
        users.sort_unstable();
        users.dedup();
        users
    }

    /// Queue a message for every connection of `user_id`.
    ///
    /// Returns the number of connections the message was queued for.
    pub async fn send_to_user(&self, user_id: DbId, message: Message) -> usize {
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values().filter(|c| c.user_id == user_id) {
            if conn.sender.send(message.clone()).is_ok() {
                count += 1;
            }
        }
        count
    }

    pub async fn has_user(&self, user_id: DbId) -> bool {
        self.connections
            .read()
            .await
            .values()
            .any(|c| c.user_id == user_id)
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

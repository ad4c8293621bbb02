use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use sakenote_core::types::DbId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::authenticate_token;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Access token; browsers cannot set headers on a WebSocket upgrade.
    pub token: String,
}

/// GET /api/v1/ws?token=<access token>
///
/// Authenticates before upgrading. The connection receives a full snapshot
/// right after it opens and again after every change to the owner's
/// collection. All snapshots come from the snapshot router in event order.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
) -> AppResult<impl IntoResponse> {
    let user = authenticate_token(&params.token, &state)?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user.user_id)))
}

/// Drive one connection: register, request the initial snapshot, forward
/// queued frames and drain inbound frames until the peer goes away.
async fn handle_socket(socket: WebSocket, state: AppState, user_id: DbId) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, user_id, "WebSocket connected");

    let mut rx = state.ws_manager.add(conn_id.clone(), user_id).await;

    state.request_snapshot(user_id);

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            // Subscription is server-push only.
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::Message;
use bson::oid::ObjectId;
use futures::SinkExt;
use tracing::{debug, warn};

use barkpark_services::notify::RealtimeChannel;

use super::storage::WsStorage;

/// Sends a JSON frame to every live session of the user. Returns true if at
/// least one session accepted it.
pub async fn send_to_user(
    ws_storage: &WsStorage,
    user_id: &ObjectId,
    message: &serde_json::Value,
) -> bool {
    let text = serde_json::to_string(message).unwrap_or_default();
    let mut delivered = false;

    for connection in ws_storage.get_connections(user_id) {
        let mut guard = connection.sender.lock().await;
        if let Err(e) = guard.send(Message::text(text.clone())).await {
            warn!(?user_id, connection_id = %connection.id, %e, "Failed to send WS message");
        } else {
            debug!(?user_id, connection_id = %connection.id, "WS message sent");
            delivered = true;
        }
    }

    delivered
}

/// The delivery router's realtime channel, backed by the WebSocket session
/// storage.
pub struct WsRealtime {
    storage: Arc<WsStorage>,
}

impl WsRealtime {
    pub fn new(storage: Arc<WsStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl RealtimeChannel for WsRealtime {
    async fn send(&self, user_id: &ObjectId, frame: &serde_json::Value) -> bool {
        send_to_user(&self.storage, user_id, frame).await
    }

    fn is_connected(&self, user_id: &ObjectId) -> bool {
        self.storage.is_connected(user_id)
    }

    fn is_foreground(&self, user_id: &ObjectId) -> bool {
        self.storage.is_foreground(user_id)
    }
}

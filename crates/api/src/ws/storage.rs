use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use bson::oid::ObjectId;
use dashmap::DashMap;
use futures::stream::SplitSink;
use tokio::sync::Mutex;

pub type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// One live socket session. `foreground` mirrors the client's reported app
/// state and decides whether push delivery is suppressed.
pub struct WsConnection {
    pub id: String,
    pub sender: WsSender,
    foreground: AtomicBool,
}

impl WsConnection {
    pub fn new(id: String, sender: WsSender) -> Self {
        Self {
            id,
            sender,
            // A freshly opened socket is assumed foregrounded until the
            // client says otherwise.
            foreground: AtomicBool::new(true),
        }
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground.load(Ordering::Relaxed)
    }

    pub fn set_foreground(&self, foreground: bool) {
        self.foreground.store(foreground, Ordering::Relaxed);
    }
}

/// Tracks all active WebSocket sessions by user ID. Each user can have
/// multiple sessions (multiple tabs/devices).
pub struct WsStorage {
    connections: DashMap<ObjectId, Vec<Arc<WsConnection>>>,
}

impl WsStorage {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    pub fn add(&self, user_id: ObjectId, connection: Arc<WsConnection>) {
        self.connections.entry(user_id).or_default().push(connection);
    }

    pub fn remove(&self, user_id: &ObjectId, connection_id: &str) {
        if let Some(mut connections) = self.connections.get_mut(user_id) {
            connections.retain(|c| c.id != connection_id);
            if connections.is_empty() {
                drop(connections);
                self.connections.remove(user_id);
            }
        }
    }

    pub fn get_connections(&self, user_id: &ObjectId) -> Vec<Arc<WsConnection>> {
        self.connections
            .get(user_id)
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    pub fn set_foreground(&self, user_id: &ObjectId, connection_id: &str, foreground: bool) {
        if let Some(connections) = self.connections.get(user_id) {
            if let Some(connection) = connections.iter().find(|c| c.id == connection_id) {
                connection.set_foreground(foreground);
            }
        }
    }

    pub fn is_connected(&self, user_id: &ObjectId) -> bool {
        self.connections
            .get(user_id)
            .map(|c| !c.is_empty())
            .unwrap_or(false)
    }

    pub fn is_foreground(&self, user_id: &ObjectId) -> bool {
        self.connections
            .get(user_id)
            .map(|c| c.iter().any(|conn| conn.is_foreground()))
            .unwrap_or(false)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.iter().map(|r| r.value().len()).sum()
    }
}

impl Default for WsStorage {
    fn default() -> Self {
        Self::new()
    }
}

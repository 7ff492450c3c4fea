use async_trait::async_trait;
use bson::oid::ObjectId;
use thiserror::Error;

use barkpark_db::models::PushRegistration;

/// A live realtime transport (the API crate implements this over its
/// WebSocket session storage; tests substitute fakes). Send failures are
/// reported through the return value, never panics or errors — the router
/// treats the realtime path as best-effort.
#[async_trait]
pub trait RealtimeChannel: Send + Sync {
    /// Push a JSON frame to every live session of the user. Returns true
    /// if at least one session accepted it.
    async fn send(&self, user_id: &ObjectId, frame: &serde_json::Value) -> bool;

    /// Whether the user has any live session at all.
    fn is_connected(&self, user_id: &ObjectId) -> bool;

    /// Whether any of the user's live sessions is in the foreground.
    fn is_foreground(&self, user_id: &ObjectId) -> bool;
}

#[derive(Debug, Error)]
pub enum PushSendError {
    /// The subscription is permanently gone; the registration should be
    /// deactivated, not retried.
    #[error("Push endpoint permanently invalid")]
    EndpointInvalid,
    #[error("Push delivery failed: {0}")]
    Other(String),
}

/// An out-of-band push provider for one device registration.
#[async_trait]
pub trait PushChannel: Send + Sync {
    async fn send(
        &self,
        registration: &PushRegistration,
        payload: &serde_json::Value,
    ) -> Result<(), PushSendError>;
}

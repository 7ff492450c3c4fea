use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Idempotency record for a triggering domain event (visit id, rating id,
/// friend-request id). The unique `(user_id, event_key)` index turns a
/// replayed trigger into a duplicate-key insert, which the engine treats as
/// "already processed".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedEvent {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub event_key: String,
    pub created_at: DateTime,
}

impl ProcessedEvent {
    pub const COLLECTION: &'static str = "processed_events";
}

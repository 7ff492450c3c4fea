use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// A Web Push subscription for one device. A user may hold several at once
/// (multi-device); invalid or replaced registrations are deactivated, never
/// deleted, so delivery history stays auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRegistration {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub endpoint: String,
    pub keys: PushKeys,
    pub platform: PushPlatform,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub last_used_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn default_true() -> bool {
    true
}

impl PushRegistration {
    pub const COLLECTION: &'static str = "push_registrations";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushPlatform {
    Web,
    Ios,
    Android,
}

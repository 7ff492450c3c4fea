use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Minimal user document. Account management lives in a separate service;
/// the engine only needs identity and existence checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub timezone: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    pub const COLLECTION: &'static str = "users";
}

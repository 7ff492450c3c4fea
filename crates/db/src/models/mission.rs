use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Per-user instance of a catalog mission, created lazily on the first
/// progress update.
///
/// Status only moves forward: active → completed (→ claimed via the
/// `rewards_claimed` flag), or active → expired/failed which are terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMission {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub mission_id: String,
    pub progress: Vec<RequirementProgress>,
    pub status: MissionStatus,
    #[serde(default)]
    pub rewards_claimed: bool,
    pub claimed_at: Option<DateTime>,
    pub completed_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl UserMission {
    pub const COLLECTION: &'static str = "user_missions";

    pub fn all_requirements_complete(&self) -> bool {
        !self.progress.is_empty() && self.progress.iter().all(|p| p.completed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementProgress {
    pub current: u32,
    pub target: u32,
    #[serde(default)]
    pub completed: bool,
    pub completed_at: Option<DateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Active,
    Completed,
    Failed,
    Expired,
}

impl MissionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MissionStatus::Failed | MissionStatus::Expired)
    }
}

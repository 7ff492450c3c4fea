use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Per-user gamification state, one document per user.
///
/// `points` and `level` are caches: `points` must always equal the sum of
/// the user's ledger transactions and `level` is derived from the level
/// table. `last_activity_date` is a `YYYY-MM-DD` string in the server's
/// UTC calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamificationProfile {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub points: i64,
    pub level: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<String>,
    #[serde(default)]
    pub badges: Vec<EarnedBadge>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl GamificationProfile {
    pub const COLLECTION: &'static str = "gamification_profiles";

    pub fn has_badge(&self, badge_id: &str) -> bool {
        self.badges.iter().any(|b| b.badge_id == badge_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarnedBadge {
    pub badge_id: String,
    pub earned_at: DateTime,
}

/// Immutable ledger entry. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsTransaction {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub action: PointsAction,
    pub amount: i64,
    #[serde(default)]
    pub context: bson::Document,
    pub created_at: DateTime,
}

impl PointsTransaction {
    pub const COLLECTION: &'static str = "points_transactions";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointsAction {
    CheckIn,
    CheckOut,
    RatingCreated,
    RatingUpdated,
    FriendAccepted,
    MissionReward,
    BadgeReward,
    AdminAdjustment,
}

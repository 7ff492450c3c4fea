use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;

use barkpark_db::models::{MissionStatus, RequirementProgress, UserMission};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct MissionDao {
    pub base: BaseDao<UserMission>,
}

impl MissionDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, UserMission::COLLECTION),
        }
    }

    pub async fn find(&self, user_id: ObjectId, mission_id: &str) -> DaoResult<Option<UserMission>> {
        self.base
            .find_one(doc! { "user_id": user_id, "mission_id": mission_id })
            .await
    }

    pub async fn find_all_for_user(&self, user_id: ObjectId) -> DaoResult<Vec<UserMission>> {
        self.base
            .find_many(doc! { "user_id": user_id }, Some(doc! { "created_at": -1 }))
            .await
    }

    /// Create the per-user row with zeroed counters. A duplicate-key result
    /// means another call created it first; the caller re-reads.
    pub async fn create(
        &self,
        user_id: ObjectId,
        mission_id: &str,
        targets: &[u32],
    ) -> DaoResult<UserMission> {
        let now = DateTime::now();
        let mission = UserMission {
            id: None,
            user_id,
            mission_id: mission_id.to_string(),
            progress: targets
                .iter()
                .map(|&target| RequirementProgress {
                    current: 0,
                    target,
                    completed: false,
                    completed_at: None,
                })
                .collect(),
            status: MissionStatus::Active,
            rewards_claimed: false,
            claimed_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        match self.base.insert_one(&mission).await {
            Ok(id) => self.base.find_by_id(id).await,
            Err(DaoError::DuplicateKey(_)) => self
                .find(user_id, mission_id)
                .await?
                .ok_or(DaoError::NotFound),
            Err(e) => Err(e),
        }
    }

    pub async fn save_progress(
        &self,
        user_id: ObjectId,
        mission_id: &str,
        progress: &[RequirementProgress],
        status: MissionStatus,
        completed_at: Option<DateTime>,
    ) -> DaoResult<bool> {
        let status = bson::to_bson(&status)?;
        let progress = bson::to_bson(progress)?;
        self.base
            .update_one(
                doc! { "user_id": user_id, "mission_id": mission_id },
                doc! {
                    "$set": {
                        "progress": progress,
                        "status": status,
                        "completed_at": completed_at,
                    }
                },
            )
            .await
    }

    /// Conditional claim: matches only a completed, unclaimed row, so of two
    /// concurrent claims exactly one gets the post-update document back.
    pub async fn try_claim(
        &self,
        user_id: ObjectId,
        mission_id: &str,
    ) -> DaoResult<Option<UserMission>> {
        self.base
            .find_one_and_update(
                doc! {
                    "user_id": user_id,
                    "mission_id": mission_id,
                    "status": "completed",
                    "rewards_claimed": false,
                },
                doc! {
                    "$set": {
                        "rewards_claimed": true,
                        "claimed_at": DateTime::now(),
                    }
                },
            )
            .await
    }

    pub async fn mark_expired(&self, user_id: ObjectId, mission_id: &str) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! {
                    "user_id": user_id,
                    "mission_id": mission_id,
                    "status": "active",
                },
                doc! { "$set": { "status": "expired" } },
            )
            .await
    }

    pub async fn count_completed(&self, user_id: ObjectId) -> DaoResult<u64> {
        self.base
            .count(doc! { "user_id": user_id, "status": "completed" })
            .await
    }

    /// Participants who ever started a mission, for max-participant caps.
    pub async fn count_participants(&self, mission_id: &str) -> DaoResult<u64> {
        self.base.count(doc! { "mission_id": mission_id }).await
    }
}

use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;

use barkpark_db::models::{EarnedBadge, GamificationProfile};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct ProfileDao {
    pub base: BaseDao<GamificationProfile>,
}

impl ProfileDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, GamificationProfile::COLLECTION),
        }
    }

    /// Fetch the user's profile, creating an empty one on first contact.
    pub async fn get_or_create(&self, user_id: ObjectId) -> DaoResult<GamificationProfile> {
        if let Some(profile) = self.base.find_one(doc! { "user_id": user_id }).await? {
            return Ok(profile);
        }

        let now = DateTime::now();
        let profile = GamificationProfile {
            id: None,
            user_id,
            points: 0,
            level: 1,
            current_streak: 0,
            longest_streak: 0,
            last_activity_date: None,
            badges: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        match self.base.insert_one(&profile).await {
            Ok(id) => self.base.find_by_id(id).await,
            // Lost a creation race: the other writer's row is the one.
            Err(DaoError::DuplicateKey(_)) => self
                .base
                .find_one(doc! { "user_id": user_id })
                .await?
                .ok_or(DaoError::NotFound),
            Err(e) => Err(e),
        }
    }

    pub async fn find(&self, user_id: ObjectId) -> DaoResult<GamificationProfile> {
        self.base
            .find_one(doc! { "user_id": user_id })
            .await?
            .ok_or(DaoError::NotFound)
    }

    /// Increment cached points and refresh the cached level.
    pub async fn add_points(
        &self,
        user_id: ObjectId,
        amount: i64,
        new_level: u32,
    ) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "user_id": user_id },
                doc! {
                    "$inc": { "points": amount },
                    "$set": { "level": new_level as i64 },
                },
            )
            .await
    }

    pub async fn set_streak(
        &self,
        user_id: ObjectId,
        current: u32,
        longest: u32,
        activity_date: &str,
    ) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "user_id": user_id },
                doc! {
                    "$set": {
                        "current_streak": current as i64,
                        "longest_streak": longest as i64,
                        "last_activity_date": activity_date,
                    }
                },
            )
            .await
    }

    /// Append an earned badge, guarded against duplicates in the filter so a
    /// concurrent award of the same badge matches zero documents and becomes
    /// a no-op. Returns whether this call inserted the badge.
    pub async fn award_badge(&self, user_id: ObjectId, badge_id: &str) -> DaoResult<bool> {
        let earned = EarnedBadge {
            badge_id: badge_id.to_string(),
            earned_at: DateTime::now(),
        };
        self.base
            .update_one(
                doc! {
                    "user_id": user_id,
                    "badges.badge_id": { "$ne": badge_id },
                },
                doc! { "$push": { "badges": bson::to_bson(&earned)? } },
            )
            .await
    }
}

use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;

use barkpark_db::models::{PushKeys, PushPlatform, PushRegistration};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct PushRegistrationDao {
    pub base: BaseDao<PushRegistration>,
}

impl PushRegistrationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, PushRegistration::COLLECTION),
        }
    }

    /// Upsert by (user, endpoint): re-registering a known endpoint refreshes
    /// its keys and reactivates it instead of stacking rows. A single atomic
    /// upsert, so two concurrent first-time registers of the same endpoint
    /// both succeed against one row.
    pub async fn register(
        &self,
        user_id: ObjectId,
        endpoint: String,
        keys: PushKeys,
        platform: PushPlatform,
    ) -> DaoResult<PushRegistration> {
        self.base
            .upsert_one(
                doc! { "user_id": user_id, "endpoint": &endpoint },
                doc! {
                    "$set": {
                        "keys": bson::to_bson(&keys)?,
                        "platform": bson::to_bson(&platform)?,
                        "is_active": true,
                    },
                    "$setOnInsert": {
                        "last_used_at": bson::Bson::Null,
                        "created_at": DateTime::now(),
                    },
                },
            )
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_active(&self, user_id: ObjectId) -> DaoResult<Vec<PushRegistration>> {
        self.base
            .find_many(doc! { "user_id": user_id, "is_active": true }, None)
            .await
    }

    pub async fn deactivate(&self, user_id: ObjectId, endpoint: &str) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "user_id": user_id, "endpoint": endpoint },
                doc! { "$set": { "is_active": false } },
            )
            .await
    }

    pub async fn touch(&self, id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(id, doc! { "$set": { "last_used_at": DateTime::now() } })
            .await
    }
}

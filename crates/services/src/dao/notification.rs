use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;

use barkpark_db::models::{Notification, NotificationType};

use super::base::{BaseDao, DaoResult, PaginatedResult, PaginationParams};

pub struct NotificationDao {
    pub base: BaseDao<Notification>,
}

impl NotificationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Notification::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        user_id: ObjectId,
        notification_type: NotificationType,
        title: String,
        body: String,
        data: bson::Document,
    ) -> DaoResult<Notification> {
        let notification = Notification {
            id: None,
            user_id,
            notification_type,
            title,
            body,
            data,
            is_read: false,
            read_at: None,
            created_at: DateTime::now(),
        };
        let id = self.base.insert_one(&notification).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_feed(
        &self,
        user_id: ObjectId,
        unread_only: bool,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<Notification>> {
        let mut filter = doc! { "user_id": user_id };
        if unread_only {
            filter.insert("is_read", false);
        }
        self.base
            .find_paginated(filter, Some(doc! { "created_at": -1 }), params)
            .await
    }

    pub async fn unread_count(&self, user_id: ObjectId) -> DaoResult<u64> {
        self.base
            .count(doc! { "user_id": user_id, "is_read": false })
            .await
    }

    /// Flip the read flag on one notification. Scoped to the recipient so a
    /// user can never mark someone else's entry.
    pub async fn mark_read(&self, user_id: ObjectId, id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "_id": id, "user_id": user_id, "is_read": false },
                doc! { "$set": { "is_read": true, "read_at": DateTime::now() } },
            )
            .await
    }

    pub async fn mark_many_read(&self, user_id: ObjectId, ids: &[ObjectId]) -> DaoResult<u64> {
        self.base
            .update_many(
                doc! { "_id": { "$in": ids }, "user_id": user_id, "is_read": false },
                doc! { "$set": { "is_read": true, "read_at": DateTime::now() } },
            )
            .await
    }

    pub async fn mark_all_read(&self, user_id: ObjectId) -> DaoResult<u64> {
        self.base
            .update_many(
                doc! { "user_id": user_id, "is_read": false },
                doc! { "$set": { "is_read": true, "read_at": DateTime::now() } },
            )
            .await
    }

    pub async fn delete(&self, user_id: ObjectId, id: ObjectId) -> DaoResult<bool> {
        let deleted = self
            .base
            .hard_delete(doc! { "_id": id, "user_id": user_id })
            .await?;
        Ok(deleted > 0)
    }

    pub async fn delete_all(&self, user_id: ObjectId) -> DaoResult<u64> {
        self.base.hard_delete(doc! { "user_id": user_id }).await
    }
}

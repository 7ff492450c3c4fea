use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;

use barkpark_db::models::ProcessedEvent;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct EventKeyDao {
    pub base: BaseDao<ProcessedEvent>,
}

impl EventKeyDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, ProcessedEvent::COLLECTION),
        }
    }

    /// Claim an idempotency key. `Ok(true)` means this caller owns the event
    /// and must process it; `Ok(false)` means it was already processed.
    pub async fn try_claim(&self, user_id: ObjectId, event_key: &str) -> DaoResult<bool> {
        let record = ProcessedEvent {
            id: None,
            user_id,
            event_key: event_key.to_string(),
            created_at: DateTime::now(),
        };
        match self.base.insert_one(&record).await {
            Ok(_) => Ok(true),
            Err(DaoError::DuplicateKey(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Compensating delete for a claim whose processing failed. Without it
    /// the caller's retry would look like a replay and the event would be
    /// lost.
    pub async fn release(&self, user_id: ObjectId, event_key: &str) -> DaoResult<bool> {
        let deleted = self
            .base
            .hard_delete(doc! { "user_id": user_id, "event_key": event_key })
            .await?;
        Ok(deleted > 0)
    }
}

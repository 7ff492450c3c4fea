use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;

use barkpark_db::models::{PointsAction, PointsTransaction};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct PointsDao {
    pub base: BaseDao<PointsTransaction>,
}

impl PointsDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, PointsTransaction::COLLECTION),
        }
    }

    pub async fn append(
        &self,
        user_id: ObjectId,
        action: PointsAction,
        amount: i64,
        context: bson::Document,
    ) -> DaoResult<PointsTransaction> {
        let tx = PointsTransaction {
            id: None,
            user_id,
            action,
            amount,
            context,
            created_at: DateTime::now(),
        };
        let id = self.base.insert_one(&tx).await?;
        self.base.find_by_id(id).await
    }

    pub async fn count_for_action(
        &self,
        user_id: ObjectId,
        action: PointsAction,
    ) -> DaoResult<u64> {
        let action = bson::to_bson(&action)?;
        self.base.count(doc! { "user_id": user_id, "action": action }).await
    }

    /// Sum of all transaction amounts for a user. The cached profile total
    /// must always equal this; used by tests and admin reconciliation.
    pub async fn total_for_user(&self, user_id: ObjectId) -> DaoResult<i64> {
        use futures::TryStreamExt;

        let pipeline = vec![
            doc! { "$match": { "user_id": user_id } },
            doc! { "$group": { "_id": null, "total": { "$sum": "$amount" } } },
        ];

        let mut cursor = self
            .base
            .collection()
            .aggregate(pipeline)
            .await
            .map_err(DaoError::Mongo)?;

        if let Some(doc) = cursor.try_next().await.map_err(DaoError::Mongo)? {
            return Ok(doc.get_i64("total").unwrap_or_else(|_| {
                doc.get_i32("total").map(|v| v as i64).unwrap_or(0)
            }));
        }
        Ok(0)
    }
}

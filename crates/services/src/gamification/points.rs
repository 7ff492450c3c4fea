use std::sync::Arc;

use bson::oid::ObjectId;
use tracing::{debug, info};

use barkpark_db::models::PointsAction;

use crate::catalog::Catalog;
use crate::dao::points::PointsDao;
use crate::dao::profile::ProfileDao;
use crate::dao::user::UserDao;

use super::error::{EngineError, EngineResult};
use super::level::{LevelInfo, level_for};

/// Outcome of one ledger write, carrying enough state for the caller to
/// emit `points_updated` and `level_up` events.
#[derive(Debug, Clone)]
pub struct PointsAward {
    pub action: PointsAction,
    pub amount: i64,
    pub total_before: i64,
    pub total_after: i64,
    pub level_before: LevelInfo,
    pub level_after: LevelInfo,
}

impl PointsAward {
    pub fn leveled_up(&self) -> bool {
        self.level_after.level > self.level_before.level
    }
}

/// Append-only points ledger. The transaction insert is the source of
/// truth; the profile's `points` field is a cache updated in the same
/// per-user-locked sequence, so the total is always re-derivable by
/// summing transactions.
///
/// Callers must hold the user's lock (see `UserLockRegistry`); the ledger
/// itself does not acquire it so reward flows already under the lock can
/// call straight in.
pub struct PointsLedger {
    users: Arc<UserDao>,
    profiles: Arc<ProfileDao>,
    transactions: Arc<PointsDao>,
    catalog: Arc<Catalog>,
}

impl PointsLedger {
    pub fn new(
        users: Arc<UserDao>,
        profiles: Arc<ProfileDao>,
        transactions: Arc<PointsDao>,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            users,
            profiles,
            transactions,
            catalog,
        }
    }

    pub async fn award(
        &self,
        user_id: ObjectId,
        action: PointsAction,
        explicit_amount: Option<i64>,
        context: bson::Document,
    ) -> EngineResult<PointsAward> {
        if let Some(amount) = explicit_amount {
            if amount < 0 {
                return Err(EngineError::InvalidAmount(amount));
            }
        }

        if !self.users.exists(user_id).await? {
            return Err(EngineError::UserNotFound);
        }

        let amount = explicit_amount.unwrap_or_else(|| self.catalog.points_for(action));
        let profile = self.profiles.get_or_create(user_id).await?;

        let total_before = profile.points;
        let total_after = total_before + amount;
        let level_before = level_for(&self.catalog, total_before);
        let level_after = level_for(&self.catalog, total_after);

        self.transactions
            .append(user_id, action, amount, context)
            .await?;
        self.profiles
            .add_points(user_id, amount, level_after.level)
            .await?;

        debug!(%user_id, ?action, amount, total_after, "Points awarded");
        if level_after.level > level_before.level {
            info!(%user_id, from = level_before.level, to = level_after.level, "Level up");
        }

        Ok(PointsAward {
            action,
            amount,
            total_before,
            total_after,
            level_before,
            level_after,
        })
    }

    /// Ledger-derived total, for reconciliation against the cached profile
    /// value.
    pub async fn derived_total(&self, user_id: ObjectId) -> EngineResult<i64> {
        Ok(self.transactions.total_for_user(user_id).await?)
    }
}

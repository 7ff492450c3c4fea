use std::sync::Arc;

use bson::{doc, oid::ObjectId};
use tracing::{info, warn};

use barkpark_db::models::PointsAction;

use crate::catalog::{BadgeCategory, BadgeDefinition, Catalog, UserStats};
use crate::dao::profile::ProfileDao;

use super::error::EngineResult;
use super::points::PointsLedger;

#[derive(Debug, Clone)]
pub struct AwardedBadge {
    pub badge_id: String,
    pub name: String,
    pub rarity: crate::catalog::BadgeRarity,
    pub point_reward: i64,
}

/// Matches user statistics against the badge catalog and awards each badge
/// at most once. Callers hold the user lock; the guarded array push in
/// `ProfileDao::award_badge` additionally turns any concurrent duplicate
/// attempt into a skip rather than an error.
pub struct BadgeEvaluator {
    profiles: Arc<ProfileDao>,
    ledger: Arc<PointsLedger>,
    catalog: Arc<Catalog>,
}

impl BadgeEvaluator {
    pub fn new(
        profiles: Arc<ProfileDao>,
        ledger: Arc<PointsLedger>,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            profiles,
            ledger,
            catalog,
        }
    }

    /// Scan catalog badges in `category` against `stats` and award every
    /// unearned badge whose target is met. Returns only the badges this
    /// call actually inserted.
    pub async fn check_and_award(
        &self,
        user_id: ObjectId,
        category: BadgeCategory,
        stats: &UserStats,
    ) -> EngineResult<Vec<AwardedBadge>> {
        let profile = self.profiles.get_or_create(user_id).await?;
        let mut awarded = Vec::new();

        for badge in self.catalog.badges_in_category(category) {
            if profile.has_badge(badge.id) {
                continue;
            }
            if stats.value_of(badge.stat) < badge.target {
                continue;
            }

            // false = another writer pushed it first; treat as already earned
            if !self.profiles.award_badge(user_id, badge.id).await? {
                continue;
            }

            info!(%user_id, badge = badge.id, "Badge awarded");
            self.award_reward_points(user_id, badge).await;

            awarded.push(AwardedBadge {
                badge_id: badge.id.to_string(),
                name: badge.name.to_string(),
                rarity: badge.rarity,
                point_reward: badge.point_reward,
            });
        }

        Ok(awarded)
    }

    /// Badge reward points are best-effort relative to the badge insert:
    /// the earned row is already durable, so a ledger failure here is
    /// logged and the badge stands.
    async fn award_reward_points(&self, user_id: ObjectId, badge: &BadgeDefinition) {
        if badge.point_reward <= 0 {
            return;
        }
        let context = doc! { "badge_id": badge.id };
        if let Err(e) = self
            .ledger
            .award(
                user_id,
                PointsAction::BadgeReward,
                Some(badge.point_reward),
                context,
            )
            .await
        {
            warn!(%user_id, badge = badge.id, %e, "Badge reward points failed");
        }
    }
}

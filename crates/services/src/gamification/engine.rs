use std::sync::Arc;

use bson::{doc, oid::ObjectId};
use tracing::{debug, info};

use barkpark_db::models::{NotificationType, PointsAction};

use crate::catalog::{BadgeCategory, Catalog, UserStats};
use crate::dao::event_key::EventKeyDao;
use crate::dao::points::PointsDao;
use crate::dao::profile::ProfileDao;
use crate::dao::user::UserDao;
use crate::notify::{GamificationEvent, Notifier};

use super::badges::{AwardedBadge, BadgeEvaluator};
use super::error::{EngineError, EngineResult};
use super::level::{LevelInfo, level_for};
use super::locks::UserLockRegistry;
use super::missions::{AvailableMission, MissionClaim, MissionTracker, ProgressUpdate};
use super::points::{PointsAward, PointsLedger};
use super::streak::{StreakTracker, StreakUpdate};

/// Result of feeding one triggering domain event through the engine.
/// `duplicate` means the idempotency key was already claimed and nothing
/// was run.
#[derive(Debug, Default)]
pub struct TriggerOutcome {
    pub duplicate: bool,
    pub points: Option<PointsAward>,
    pub streak: Option<StreakUpdate>,
    pub badges: Vec<AwardedBadge>,
}

#[derive(Debug, Clone)]
pub struct GamificationStats {
    pub points: i64,
    pub level: LevelInfo,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub badge_count: usize,
    pub missions_completed: u64,
}

/// Facade over the per-user gamification state machines.
///
/// Every mutating entry point claims the event's idempotency key, then
/// runs the whole ledger/streak/badge/mission pass inside the user's lock,
/// and finally emits notifications and realtime events through the
/// notifier. Notification delivery can never fail a trigger — the
/// composer/router swallow all channel errors.
pub struct GamificationEngine {
    locks: Arc<UserLockRegistry>,
    users: Arc<UserDao>,
    profiles: Arc<ProfileDao>,
    transactions: Arc<PointsDao>,
    event_keys: Arc<EventKeyDao>,
    ledger: Arc<PointsLedger>,
    streaks: Arc<StreakTracker>,
    badges: Arc<BadgeEvaluator>,
    missions: Arc<MissionTracker>,
    notifier: Arc<Notifier>,
    catalog: Arc<Catalog>,
}

impl GamificationEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        locks: Arc<UserLockRegistry>,
        users: Arc<UserDao>,
        profiles: Arc<ProfileDao>,
        transactions: Arc<PointsDao>,
        event_keys: Arc<EventKeyDao>,
        ledger: Arc<PointsLedger>,
        streaks: Arc<StreakTracker>,
        badges: Arc<BadgeEvaluator>,
        missions: Arc<MissionTracker>,
        notifier: Arc<Notifier>,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            locks,
            users,
            profiles,
            transactions,
            event_keys,
            ledger,
            streaks,
            badges,
            missions,
            notifier,
            catalog,
        }
    }

    /// First check-in of a visit: points, streak, visit/streak badges.
    pub async fn handle_check_in(
        &self,
        user_id: ObjectId,
        visit_id: &str,
    ) -> EngineResult<TriggerOutcome> {
        self.require_user(user_id).await?;

        let key = format!("checkin:{visit_id}");
        if !self.event_keys.try_claim(user_id, &key).await? {
            debug!(%user_id, visit_id, "Duplicate check-in event ignored");
            return Ok(TriggerOutcome {
                duplicate: true,
                ..Default::default()
            });
        }

        match self.run_check_in(user_id, visit_id).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.release_claim(user_id, &key).await;
                Err(e)
            }
        }
    }

    async fn run_check_in(
        &self,
        user_id: ObjectId,
        visit_id: &str,
    ) -> EngineResult<TriggerOutcome> {
        let _guard = self.locks.acquire(user_id).await;

        let award = self
            .ledger
            .award(
                user_id,
                PointsAction::CheckIn,
                None,
                doc! { "visit_id": visit_id },
            )
            .await?;
        self.after_award(user_id, &award, "check_in").await;

        let streak = self.streaks.update(user_id).await?;
        self.after_streak(user_id, &streak).await;

        let stats = self.build_stats_snapshot(user_id).await?;
        let mut awarded = self
            .badges
            .check_and_award(user_id, BadgeCategory::Visits, &stats)
            .await?;
        awarded.extend(
            self.badges
                .check_and_award(user_id, BadgeCategory::Streak, &stats)
                .await?,
        );
        self.announce_badges(user_id, &awarded).await;

        info!(%user_id, visit_id, points = award.amount, streak = streak.current, "Check-in processed");

        Ok(TriggerOutcome {
            duplicate: false,
            points: Some(award),
            streak: Some(streak),
            badges: awarded,
        })
    }

    /// Checkout of a visit: points only; the streak already counted the
    /// day at check-in.
    pub async fn handle_check_out(
        &self,
        user_id: ObjectId,
        visit_id: &str,
    ) -> EngineResult<TriggerOutcome> {
        self.require_user(user_id).await?;

        let key = format!("checkout:{visit_id}");
        if !self.event_keys.try_claim(user_id, &key).await? {
            return Ok(TriggerOutcome {
                duplicate: true,
                ..Default::default()
            });
        }

        match self.run_check_out(user_id, visit_id).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.release_claim(user_id, &key).await;
                Err(e)
            }
        }
    }

    async fn run_check_out(
        &self,
        user_id: ObjectId,
        visit_id: &str,
    ) -> EngineResult<TriggerOutcome> {
        let _guard = self.locks.acquire(user_id).await;

        let award = self
            .ledger
            .award(
                user_id,
                PointsAction::CheckOut,
                None,
                doc! { "visit_id": visit_id },
            )
            .await?;
        self.after_award(user_id, &award, "check_out").await;

        Ok(TriggerOutcome {
            duplicate: false,
            points: Some(award),
            streak: None,
            badges: Vec::new(),
        })
    }

    /// A park rating created or edited. Edits earn at the reduced rate and
    /// are keyed separately from creation.
    pub async fn handle_rating(
        &self,
        user_id: ObjectId,
        rating_id: &str,
        is_update: bool,
    ) -> EngineResult<TriggerOutcome> {
        self.require_user(user_id).await?;

        let (key, action) = if is_update {
            (format!("rating_updated:{rating_id}"), PointsAction::RatingUpdated)
        } else {
            (format!("rating_created:{rating_id}"), PointsAction::RatingCreated)
        };
        if !self.event_keys.try_claim(user_id, &key).await? {
            return Ok(TriggerOutcome {
                duplicate: true,
                ..Default::default()
            });
        }

        match self.run_rating(user_id, rating_id, is_update, action).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.release_claim(user_id, &key).await;
                Err(e)
            }
        }
    }

    async fn run_rating(
        &self,
        user_id: ObjectId,
        rating_id: &str,
        is_update: bool,
        action: PointsAction,
    ) -> EngineResult<TriggerOutcome> {
        let _guard = self.locks.acquire(user_id).await;

        let award = self
            .ledger
            .award(user_id, action, None, doc! { "rating_id": rating_id })
            .await?;
        self.after_award(user_id, &award, "rating").await;

        let mut awarded = Vec::new();
        if !is_update {
            let stats = self.build_stats_snapshot(user_id).await?;
            awarded = self
                .badges
                .check_and_award(user_id, BadgeCategory::Ratings, &stats)
                .await?;
            self.announce_badges(user_id, &awarded).await;
        }

        Ok(TriggerOutcome {
            duplicate: false,
            points: Some(award),
            streak: None,
            badges: awarded,
        })
    }

    /// A friend request was accepted (this user's side of the edge).
    pub async fn handle_friend_accepted(
        &self,
        user_id: ObjectId,
        friend_id: ObjectId,
        request_id: &str,
    ) -> EngineResult<TriggerOutcome> {
        self.require_user(user_id).await?;

        let key = format!("friend_accepted:{request_id}");
        if !self.event_keys.try_claim(user_id, &key).await? {
            return Ok(TriggerOutcome {
                duplicate: true,
                ..Default::default()
            });
        }

        match self.run_friend_accepted(user_id, friend_id, request_id).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.release_claim(user_id, &key).await;
                Err(e)
            }
        }
    }

    async fn run_friend_accepted(
        &self,
        user_id: ObjectId,
        friend_id: ObjectId,
        request_id: &str,
    ) -> EngineResult<TriggerOutcome> {
        let _guard = self.locks.acquire(user_id).await;

        let award = self
            .ledger
            .award(
                user_id,
                PointsAction::FriendAccepted,
                None,
                doc! { "friend_id": friend_id, "request_id": request_id },
            )
            .await?;
        self.after_award(user_id, &award, "friend_accepted").await;

        let stats = self.build_stats_snapshot(user_id).await?;
        let awarded = self
            .badges
            .check_and_award(user_id, BadgeCategory::Social, &stats)
            .await?;
        self.announce_badges(user_id, &awarded).await;

        self.notifier
            .create(
                user_id,
                NotificationType::FriendAccepted,
                "New friend",
                "You are now friends",
                doc! { "targetId": friend_id.to_hex() },
            )
            .await?;

        Ok(TriggerOutcome {
            duplicate: false,
            points: Some(award),
            streak: None,
            badges: awarded,
        })
    }

    /// Advance one mission requirement under the user lock.
    pub async fn mission_progress(
        &self,
        user_id: ObjectId,
        mission_id: &str,
        requirement_index: usize,
        increment_by: u32,
    ) -> EngineResult<ProgressUpdate> {
        self.require_user(user_id).await?;
        let _guard = self.locks.acquire(user_id).await;

        let update = self
            .missions
            .update_progress(user_id, mission_id, requirement_index, increment_by)
            .await?;

        if update.newly_completed {
            self.notifier
                .create(
                    user_id,
                    NotificationType::System,
                    "Mission completed",
                    "All requirements met — claim your reward",
                    doc! { "missionId": mission_id },
                )
                .await?;
        }

        Ok(update)
    }

    /// Claim a completed mission's rewards under the user lock.
    pub async fn claim_mission(
        &self,
        user_id: ObjectId,
        mission_id: &str,
    ) -> EngineResult<MissionClaim> {
        self.require_user(user_id).await?;
        let _guard = self.locks.acquire(user_id).await;

        let claim = self.missions.claim_rewards(user_id, mission_id).await?;

        self.notifier
            .send_event(
                user_id,
                GamificationEvent::MissionCompleted {
                    mission_id: claim.mission_id.clone(),
                    points_awarded: claim.points_awarded,
                },
            )
            .await;

        if claim.points_awarded > 0 {
            let profile = self.profiles.get_or_create(user_id).await?;
            self.notifier
                .send_event(
                    user_id,
                    GamificationEvent::PointsUpdated {
                        points: profile.points,
                        amount: claim.points_awarded,
                        reason: "mission_reward".to_string(),
                    },
                )
                .await;
        }

        self.announce_badges(user_id, &claim.badges).await;

        Ok(claim)
    }

    pub async fn available_missions(
        &self,
        user_id: ObjectId,
    ) -> EngineResult<Vec<AvailableMission<'_>>> {
        self.require_user(user_id).await?;
        self.missions.available_missions(user_id).await
    }

    pub async fn stats(&self, user_id: ObjectId) -> EngineResult<GamificationStats> {
        self.require_user(user_id).await?;
        let profile = self.profiles.get_or_create(user_id).await?;
        let missions_completed = self.missions.completed_count(user_id).await?;

        Ok(GamificationStats {
            points: profile.points,
            level: level_for(&self.catalog, profile.points),
            current_streak: profile.current_streak,
            longest_streak: profile.longest_streak,
            badge_count: profile.badges.len(),
            missions_completed,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    async fn require_user(&self, user_id: ObjectId) -> EngineResult<()> {
        if !self.users.exists(user_id).await? {
            return Err(EngineError::UserNotFound);
        }
        Ok(())
    }

    /// Undo an idempotency claim whose pass failed, so the caller's retry is
    /// processed instead of reported as a replay. If the release itself
    /// fails the key stays claimed and the event needs manual attention;
    /// that beats paying it twice.
    async fn release_claim(&self, user_id: ObjectId, key: &str) {
        if let Err(e) = self.event_keys.release(user_id, key).await {
            tracing::warn!(%user_id, key, %e, "Failed to release event key after error");
        }
    }

    /// Statistics snapshot the badge requirements are evaluated against.
    /// Friends are proxied by accepted-friend ledger entries; visits by
    /// check-in entries.
    async fn build_stats_snapshot(&self, user_id: ObjectId) -> EngineResult<UserStats> {
        let profile = self.profiles.get_or_create(user_id).await?;
        let total_visits = self
            .transactions
            .count_for_action(user_id, PointsAction::CheckIn)
            .await?;
        let ratings_count = self
            .transactions
            .count_for_action(user_id, PointsAction::RatingCreated)
            .await?;
        let friends_count = self
            .transactions
            .count_for_action(user_id, PointsAction::FriendAccepted)
            .await?;
        let missions_completed = self.missions.completed_count(user_id).await?;

        Ok(UserStats {
            total_visits,
            current_streak: profile.current_streak,
            friends_count,
            ratings_count,
            missions_completed,
        })
    }

    /// Realtime points event, plus a persisted level-up notification when
    /// a threshold was crossed.
    async fn after_award(&self, user_id: ObjectId, award: &PointsAward, reason: &str) {
        self.notifier
            .send_event(
                user_id,
                GamificationEvent::PointsUpdated {
                    points: award.total_after,
                    amount: award.amount,
                    reason: reason.to_string(),
                },
            )
            .await;

        if award.leveled_up() {
            self.notifier
                .send_event(
                    user_id,
                    GamificationEvent::LevelUp {
                        level: award.level_after.level,
                        previous_level: award.level_before.level,
                        title: award.level_after.title.clone(),
                    },
                )
                .await;

            let body = format!("You reached level {}", award.level_after.level);
            if let Err(e) = self
                .notifier
                .create(
                    user_id,
                    NotificationType::LevelUp,
                    award.level_after.title.clone(),
                    body,
                    doc! { "level": award.level_after.level as i64 },
                )
                .await
            {
                tracing::warn!(%user_id, %e, "Level-up notification failed");
            }
        }
    }

    async fn after_streak(&self, user_id: ObjectId, streak: &StreakUpdate) {
        if !streak.changed() {
            return;
        }

        self.notifier
            .send_event(
                user_id,
                GamificationEvent::StreakUpdated {
                    streak: streak.current,
                    previous_streak: streak.previous,
                    longest_streak: streak.longest,
                },
            )
            .await;

        if let Some(days) = streak.milestone {
            let body = format!("{days} days in a row at the park");
            if let Err(e) = self
                .notifier
                .create(
                    user_id,
                    NotificationType::AchievementEarned,
                    "Streak milestone",
                    body,
                    doc! { "milestone": days as i64 },
                )
                .await
            {
                tracing::warn!(%user_id, %e, "Milestone notification failed");
            }
        }
    }

    /// Feed entry plus realtime frame per newly earned badge. Best-effort:
    /// the badge row is already durable.
    async fn announce_badges(&self, user_id: ObjectId, badges: &[AwardedBadge]) {
        for badge in badges {
            self.notifier
                .send_event(
                    user_id,
                    GamificationEvent::AchievementUnlocked {
                        badge_id: badge.badge_id.clone(),
                        name: badge.name.clone(),
                        rarity: format!("{:?}", badge.rarity).to_lowercase(),
                    },
                )
                .await;

            let body = format!("You earned the {} badge", badge.name);
            if let Err(e) = self
                .notifier
                .create(
                    user_id,
                    NotificationType::AchievementEarned,
                    badge.name.clone(),
                    body,
                    doc! { "badgeId": badge.badge_id.clone() },
                )
                .await
            {
                tracing::warn!(%user_id, badge = %badge.badge_id, %e, "Badge notification failed");
            }
        }
    }
}

use std::sync::Arc;

use bson::{DateTime, doc, oid::ObjectId};
use chrono::Utc;
use tracing::{info, warn};

use barkpark_db::models::{MissionStatus, PointsAction, UserMission};

use crate::catalog::{Catalog, MissionDefinition};
use crate::dao::mission::MissionDao;
use crate::dao::profile::ProfileDao;

use super::badges::AwardedBadge;
use super::error::{EngineError, EngineResult};
use super::points::PointsLedger;

#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub mission: UserMission,
    /// True when this call promoted the mission to completed.
    pub newly_completed: bool,
}

#[derive(Debug, Clone)]
pub struct MissionClaim {
    pub mission_id: String,
    pub points_awarded: i64,
    pub badges: Vec<AwardedBadge>,
    pub special_reward: Option<String>,
}

/// A catalog mission paired with the user's progress row, if any.
pub struct AvailableMission<'a> {
    pub definition: &'a MissionDefinition,
    pub user_mission: Option<UserMission>,
}

/// Per-(user, mission) progress state machine.
///
/// active → completed → claimed (via `rewards_claimed`), or
/// active → expired/failed which are terminal. Counters clamp at their
/// target and never move backwards. Callers hold the user lock for the
/// mutating operations.
pub struct MissionTracker {
    missions: Arc<MissionDao>,
    profiles: Arc<ProfileDao>,
    ledger: Arc<PointsLedger>,
    catalog: Arc<Catalog>,
}

impl MissionTracker {
    pub fn new(
        missions: Arc<MissionDao>,
        profiles: Arc<ProfileDao>,
        ledger: Arc<PointsLedger>,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            missions,
            profiles,
            ledger,
            catalog,
        }
    }

    pub async fn update_progress(
        &self,
        user_id: ObjectId,
        mission_id: &str,
        requirement_index: usize,
        increment_by: u32,
    ) -> EngineResult<ProgressUpdate> {
        let definition = self
            .catalog
            .mission(mission_id)
            .ok_or_else(|| EngineError::MissionNotFound(mission_id.to_string()))?;

        if requirement_index >= definition.requirements.len() {
            return Err(EngineError::InvalidRequirementIndex {
                mission: mission_id.to_string(),
                index: requirement_index,
            });
        }

        let now = Utc::now();
        let existing = self.missions.find(user_id, mission_id).await?;

        let mut row = match existing {
            Some(row) => row,
            None => {
                if !definition.window_contains(now) {
                    return Err(EngineError::MissionExpired);
                }
                if let Some(cap) = definition.max_participants {
                    if self.missions.count_participants(mission_id).await? >= cap {
                        return Err(EngineError::MissionFull);
                    }
                }
                let targets: Vec<u32> =
                    definition.requirements.iter().map(|r| r.target).collect();
                self.missions.create(user_id, mission_id, &targets).await?
            }
        };

        match row.status {
            MissionStatus::Active => {}
            MissionStatus::Completed => return Err(EngineError::MissionAlreadyCompleted),
            MissionStatus::Expired | MissionStatus::Failed => {
                return Err(EngineError::MissionExpired);
            }
        }

        // The window may have closed since the row was created.
        if !definition.window_contains(now) {
            self.missions.mark_expired(user_id, mission_id).await?;
            return Err(EngineError::MissionExpired);
        }

        // A row created under an older catalog may hold fewer requirement
        // slots than the current definition.
        if requirement_index >= row.progress.len() {
            return Err(EngineError::InvalidRequirementIndex {
                mission: mission_id.to_string(),
                index: requirement_index,
            });
        }

        let progress = &mut row.progress[requirement_index];
        let clamped = progress.current.saturating_add(increment_by).min(progress.target);
        progress.current = clamped;
        if clamped >= progress.target && !progress.completed {
            progress.completed = true;
            progress.completed_at = Some(DateTime::now());
        }

        let newly_completed = row.all_requirements_complete();
        let (status, completed_at) = if newly_completed {
            (MissionStatus::Completed, Some(DateTime::now()))
        } else {
            (MissionStatus::Active, None)
        };

        self.missions
            .save_progress(user_id, mission_id, &row.progress, status, completed_at)
            .await?;
        row.status = status;
        row.completed_at = completed_at;

        if newly_completed {
            info!(%user_id, mission_id, "Mission completed");
        }

        Ok(ProgressUpdate {
            mission: row,
            newly_completed,
        })
    }

    /// The claim step. Exactly one of two concurrent claims wins the
    /// conditional update; the loser is told why based on the row it lost
    /// to.
    pub async fn claim_rewards(
        &self,
        user_id: ObjectId,
        mission_id: &str,
    ) -> EngineResult<MissionClaim> {
        let definition = self
            .catalog
            .mission(mission_id)
            .ok_or_else(|| EngineError::MissionNotFound(mission_id.to_string()))?;

        let claimed = self.missions.try_claim(user_id, mission_id).await?;

        if claimed.is_none() {
            return match self.missions.find(user_id, mission_id).await? {
                Some(row) if row.rewards_claimed => Err(EngineError::RewardsAlreadyClaimed),
                _ => Err(EngineError::MissionNotReady),
            };
        }

        // The claim flag is durable from here on; reward side effects are
        // individually fault-tolerant and never roll it back.
        let points = (definition.reward.points as f64 * self.catalog.mission_bonus_multiplier)
            .round() as i64;

        let points_awarded = match self
            .ledger
            .award(
                user_id,
                PointsAction::MissionReward,
                Some(points),
                doc! { "mission_id": mission_id },
            )
            .await
        {
            Ok(award) => award.amount,
            Err(e) => {
                warn!(%user_id, mission_id, %e, "Mission reward points failed");
                0
            }
        };

        let mut badges = Vec::new();
        for badge_id in definition.reward.badge_ids {
            match self.grant_badge(user_id, badge_id).await {
                Ok(Some(awarded)) => badges.push(awarded),
                Ok(None) => {}
                Err(e) => {
                    warn!(%user_id, mission_id, badge_id, %e, "Mission badge award failed");
                }
            }
        }

        info!(%user_id, mission_id, points_awarded, "Mission rewards claimed");

        Ok(MissionClaim {
            mission_id: mission_id.to_string(),
            points_awarded,
            badges,
            special_reward: definition.reward.special_reward.map(str::to_string),
        })
    }

    /// Direct grant of a mission-reward badge, bypassing the stat check but
    /// keeping the once-per-user guarantee.
    async fn grant_badge(
        &self,
        user_id: ObjectId,
        badge_id: &str,
    ) -> EngineResult<Option<AwardedBadge>> {
        let badge = match self.catalog.badge(badge_id) {
            Some(b) => b,
            None => return Ok(None),
        };

        if !self.profiles.award_badge(user_id, badge_id).await? {
            return Ok(None);
        }

        if badge.point_reward > 0 {
            if let Err(e) = self
                .ledger
                .award(
                    user_id,
                    PointsAction::BadgeReward,
                    Some(badge.point_reward),
                    doc! { "badge_id": badge_id },
                )
                .await
            {
                warn!(%user_id, badge_id, %e, "Badge reward points failed");
            }
        }

        Ok(Some(AwardedBadge {
            badge_id: badge.id.to_string(),
            name: badge.name.to_string(),
            rarity: badge.rarity,
            point_reward: badge.point_reward,
        }))
    }

    /// Catalog missions whose validity window contains `now` and that the
    /// user has not already exhausted. In-flight rows whose window has
    /// closed are flipped to expired on the way through.
    pub async fn available_missions(
        &self,
        user_id: ObjectId,
    ) -> EngineResult<Vec<AvailableMission<'_>>> {
        let now = Utc::now();
        let rows = self.missions.find_all_for_user(user_id).await?;

        let mut available = Vec::new();
        for definition in &self.catalog.missions {
            let row = rows
                .iter()
                .find(|r| r.mission_id == definition.id)
                .cloned();

            if let Some(ref r) = row {
                if r.status == MissionStatus::Active && !definition.window_contains(now) {
                    self.missions.mark_expired(user_id, definition.id).await?;
                    continue;
                }
                // A claimed mission is exhausted for its window, recurring
                // kinds included; a fresh window gets a fresh catalog entry.
                if r.rewards_claimed {
                    continue;
                }
            }

            if !definition.window_contains(now) {
                continue;
            }

            if row.is_none() {
                if let Some(cap) = definition.max_participants {
                    if self.missions.count_participants(definition.id).await? >= cap {
                        continue;
                    }
                }
            }

            available.push(AvailableMission {
                definition,
                user_mission: row,
            });
        }

        Ok(available)
    }

    pub async fn completed_count(&self, user_id: ObjectId) -> EngineResult<u64> {
        Ok(self.missions.count_completed(user_id).await?)
    }
}

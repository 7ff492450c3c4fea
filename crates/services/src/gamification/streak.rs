use std::sync::Arc;

use bson::oid::ObjectId;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::dao::profile::ProfileDao;
use crate::dao::user::UserDao;

use super::error::{EngineError, EngineResult};

/// How a qualifying visit relates to the recorded streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTransition {
    /// Second (or later) visit on the same day: idempotent no-op.
    SameDay,
    /// Last qualifying day was exactly yesterday: streak continues.
    Continued,
    /// First visit ever, or a gap of two or more days: streak restarts at 1.
    Restarted,
}

/// Pure transition rule over calendar days. Day boundary is the server's
/// UTC calendar day; a late-night visit counts for whatever UTC day it
/// lands on.
pub fn classify(last_activity: Option<NaiveDate>, today: NaiveDate) -> StreakTransition {
    match last_activity {
        Some(last) if last == today => StreakTransition::SameDay,
        Some(last) if today.signed_duration_since(last).num_days() == 1 => {
            StreakTransition::Continued
        }
        _ => StreakTransition::Restarted,
    }
}

#[derive(Debug, Clone)]
pub struct StreakUpdate {
    pub transition: StreakTransition,
    pub previous: u32,
    pub current: u32,
    pub longest: u32,
    /// Set when the new length crosses a catalog milestone (7/30/100).
    pub milestone: Option<u32>,
}

impl StreakUpdate {
    pub fn changed(&self) -> bool {
        self.transition != StreakTransition::SameDay
    }
}

/// Maintains the consecutive-day visit streak. One call per qualifying
/// visit; same-day repeats never double-increment. Callers hold the user
/// lock.
pub struct StreakTracker {
    users: Arc<UserDao>,
    profiles: Arc<ProfileDao>,
    catalog: Arc<Catalog>,
}

impl StreakTracker {
    pub fn new(users: Arc<UserDao>, profiles: Arc<ProfileDao>, catalog: Arc<Catalog>) -> Self {
        Self {
            users,
            profiles,
            catalog,
        }
    }

    pub async fn update(&self, user_id: ObjectId) -> EngineResult<StreakUpdate> {
        self.update_for_day(user_id, chrono::Utc::now().date_naive())
            .await
    }

    /// Same as `update` but with an explicit "today", so day-boundary
    /// behavior stays testable.
    pub async fn update_for_day(
        &self,
        user_id: ObjectId,
        today: NaiveDate,
    ) -> EngineResult<StreakUpdate> {
        if !self.users.exists(user_id).await? {
            return Err(EngineError::UserNotFound);
        }

        let profile = self.profiles.get_or_create(user_id).await?;
        let last_activity = profile
            .last_activity_date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

        let transition = classify(last_activity, today);
        let previous = profile.current_streak;

        let current = match transition {
            StreakTransition::SameDay => {
                debug!(%user_id, streak = previous, "Repeat visit today, streak unchanged");
                return Ok(StreakUpdate {
                    transition,
                    previous,
                    current: previous,
                    longest: profile.longest_streak,
                    milestone: None,
                });
            }
            StreakTransition::Continued => previous + 1,
            StreakTransition::Restarted => 1,
        };

        let longest = profile.longest_streak.max(current);
        self.profiles
            .set_streak(user_id, current, longest, &today.format("%Y-%m-%d").to_string())
            .await?;

        let milestone = self
            .catalog
            .streak_milestones
            .iter()
            .copied()
            .find(|&m| current == m);

        if let Some(days) = milestone {
            info!(%user_id, days, "Streak milestone reached");
        } else {
            debug!(%user_id, streak = current, ?transition, "Streak updated");
        }

        Ok(StreakUpdate {
            transition,
            previous,
            current,
            longest,
            milestone,
        })
    }
}

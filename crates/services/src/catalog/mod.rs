use std::collections::HashMap;

use barkpark_db::models::PointsAction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Level table is empty")]
    EmptyLevelTable,
    #[error("Level table thresholds must be strictly ascending (row {0})")]
    NonAscendingLevels(usize),
    #[error("Duplicate badge id: {0}")]
    DuplicateBadge(String),
    #[error("Mission {mission} rewards unknown badge {badge}")]
    UnknownRewardBadge { mission: String, badge: String },
    #[error("Mission {0} has no requirements")]
    EmptyMission(String),
    #[error("Mission {mission} requirement {index} has zero target")]
    ZeroTarget { mission: String, index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeRarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// Trigger category a badge requirement is re-evaluated on. The evaluator
/// only scans badges whose category matches the triggering event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    Visits,
    Streak,
    Social,
    Ratings,
    Missions,
}

/// Statistic a badge requirement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    TotalVisits,
    CurrentStreak,
    FriendsCount,
    RatingsCount,
    MissionsCompleted,
}

/// Snapshot of the statistics badge requirements are compared against.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserStats {
    pub total_visits: u64,
    pub current_streak: u32,
    pub friends_count: u64,
    pub ratings_count: u64,
    pub missions_completed: u64,
}

impl UserStats {
    pub fn value_of(&self, stat: StatKind) -> u64 {
        match stat {
            StatKind::TotalVisits => self.total_visits,
            StatKind::CurrentStreak => self.current_streak as u64,
            StatKind::FriendsCount => self.friends_count,
            StatKind::RatingsCount => self.ratings_count,
            StatKind::MissionsCompleted => self.missions_completed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub rarity: BadgeRarity,
    pub category: BadgeCategory,
    pub stat: StatKind,
    pub target: u64,
    pub point_reward: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionKind {
    Daily,
    Weekly,
    Monthly,
    Special,
}

#[derive(Debug, Clone)]
pub struct MissionRequirement {
    pub description: &'static str,
    pub target: u32,
}

#[derive(Debug, Clone)]
pub struct MissionReward {
    pub points: i64,
    pub badge_ids: &'static [&'static str],
    pub special_reward: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct MissionDefinition {
    pub id: &'static str,
    pub kind: MissionKind,
    pub name: &'static str,
    pub description: &'static str,
    pub requirements: Vec<MissionRequirement>,
    pub reward: MissionReward,
    /// One-shot missions may carry a fixed validity window; recurring
    /// daily/weekly missions are always available.
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub max_participants: Option<u64>,
}

impl MissionDefinition {
    pub fn window_contains(&self, now: DateTime<Utc>) -> bool {
        if let Some(from) = self.valid_from {
            if now < from {
                return false;
            }
        }
        if let Some(until) = self.valid_until {
            if now > until {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct LevelThreshold {
    pub threshold: i64,
    pub title: &'static str,
}

/// Static, read-only game content: action point values, badge definitions,
/// the level table and the mission catalog. Validated once at startup; a
/// broken catalog is fatal.
pub struct Catalog {
    pub actions: HashMap<PointsAction, i64>,
    pub badges: Vec<BadgeDefinition>,
    pub levels: Vec<LevelThreshold>,
    pub missions: Vec<MissionDefinition>,
    /// Multiplier applied to a mission's base point reward at claim time.
    pub mission_bonus_multiplier: f64,
    /// Streak lengths that raise a milestone notification.
    pub streak_milestones: Vec<u32>,
}

impl Catalog {
    pub fn load() -> Result<Self, CatalogError> {
        let catalog = Self {
            actions: default_actions(),
            badges: default_badges(),
            levels: default_levels(),
            missions: default_missions(),
            mission_bonus_multiplier: 1.5,
            streak_milestones: vec![7, 30, 100],
        };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.levels.is_empty() {
            return Err(CatalogError::EmptyLevelTable);
        }
        for (i, pair) in self.levels.windows(2).enumerate() {
            if pair[1].threshold <= pair[0].threshold {
                return Err(CatalogError::NonAscendingLevels(i + 1));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for badge in &self.badges {
            if !seen.insert(badge.id) {
                return Err(CatalogError::DuplicateBadge(badge.id.to_string()));
            }
        }

        for mission in &self.missions {
            if mission.requirements.is_empty() {
                return Err(CatalogError::EmptyMission(mission.id.to_string()));
            }
            for (index, req) in mission.requirements.iter().enumerate() {
                if req.target == 0 {
                    return Err(CatalogError::ZeroTarget {
                        mission: mission.id.to_string(),
                        index,
                    });
                }
            }
            for badge_id in mission.reward.badge_ids {
                if !seen.contains(badge_id) {
                    return Err(CatalogError::UnknownRewardBadge {
                        mission: mission.id.to_string(),
                        badge: badge_id.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn points_for(&self, action: PointsAction) -> i64 {
        self.actions.get(&action).copied().unwrap_or(0)
    }

    pub fn badge(&self, id: &str) -> Option<&BadgeDefinition> {
        self.badges.iter().find(|b| b.id == id)
    }

    pub fn badges_in_category(&self, category: BadgeCategory) -> Vec<&BadgeDefinition> {
        self.badges.iter().filter(|b| b.category == category).collect()
    }

    pub fn mission(&self, id: &str) -> Option<&MissionDefinition> {
        self.missions.iter().find(|m| m.id == id)
    }
}

fn default_actions() -> HashMap<PointsAction, i64> {
    HashMap::from([
        (PointsAction::CheckIn, 10),
        (PointsAction::CheckOut, 5),
        (PointsAction::RatingCreated, 15),
        // Editing an existing rating earns at a reduced rate
        (PointsAction::RatingUpdated, 5),
        (PointsAction::FriendAccepted, 10),
    ])
}

fn default_badges() -> Vec<BadgeDefinition> {
    vec![
        BadgeDefinition {
            id: "first_visit",
            name: "First Visit",
            rarity: BadgeRarity::Common,
            category: BadgeCategory::Visits,
            stat: StatKind::TotalVisits,
            target: 1,
            point_reward: 20,
        },
        BadgeDefinition {
            id: "park_regular",
            name: "Park Regular",
            rarity: BadgeRarity::Uncommon,
            category: BadgeCategory::Visits,
            stat: StatKind::TotalVisits,
            target: 25,
            point_reward: 50,
        },
        BadgeDefinition {
            id: "park_veteran",
            name: "Park Veteran",
            rarity: BadgeRarity::Rare,
            category: BadgeCategory::Visits,
            stat: StatKind::TotalVisits,
            target: 100,
            point_reward: 150,
        },
        BadgeDefinition {
            id: "week_streak",
            name: "Seven Days Running",
            rarity: BadgeRarity::Uncommon,
            category: BadgeCategory::Streak,
            stat: StatKind::CurrentStreak,
            target: 7,
            point_reward: 70,
        },
        BadgeDefinition {
            id: "month_streak",
            name: "Thirty Days Running",
            rarity: BadgeRarity::Epic,
            category: BadgeCategory::Streak,
            stat: StatKind::CurrentStreak,
            target: 30,
            point_reward: 300,
        },
        BadgeDefinition {
            id: "hundred_streak",
            name: "Century Streak",
            rarity: BadgeRarity::Legendary,
            category: BadgeCategory::Streak,
            stat: StatKind::CurrentStreak,
            target: 100,
            point_reward: 1000,
        },
        BadgeDefinition {
            id: "social_butterfly",
            name: "Social Butterfly",
            rarity: BadgeRarity::Uncommon,
            category: BadgeCategory::Social,
            stat: StatKind::FriendsCount,
            target: 10,
            point_reward: 50,
        },
        BadgeDefinition {
            id: "first_rating",
            name: "Critic in Training",
            rarity: BadgeRarity::Common,
            category: BadgeCategory::Ratings,
            stat: StatKind::RatingsCount,
            target: 1,
            point_reward: 10,
        },
        BadgeDefinition {
            id: "top_critic",
            name: "Top Critic",
            rarity: BadgeRarity::Rare,
            category: BadgeCategory::Ratings,
            stat: StatKind::RatingsCount,
            target: 20,
            point_reward: 100,
        },
        BadgeDefinition {
            id: "mission_master",
            name: "Mission Master",
            rarity: BadgeRarity::Rare,
            category: BadgeCategory::Missions,
            stat: StatKind::MissionsCompleted,
            target: 10,
            point_reward: 120,
        },
        BadgeDefinition {
            id: "explorer",
            name: "Park Explorer",
            rarity: BadgeRarity::Uncommon,
            category: BadgeCategory::Missions,
            stat: StatKind::MissionsCompleted,
            target: 1,
            point_reward: 30,
        },
    ]
}

fn default_levels() -> Vec<LevelThreshold> {
    vec![
        LevelThreshold { threshold: 0, title: "Puppy" },
        LevelThreshold { threshold: 100, title: "Young Dog" },
        LevelThreshold { threshold: 300, title: "Good Boy" },
        LevelThreshold { threshold: 700, title: "Park Friend" },
        LevelThreshold { threshold: 1500, title: "Pack Member" },
        LevelThreshold { threshold: 3000, title: "Pack Leader" },
        LevelThreshold { threshold: 6000, title: "Alpha" },
        LevelThreshold { threshold: 12000, title: "Park Legend" },
    ]
}

fn default_missions() -> Vec<MissionDefinition> {
    vec![
        MissionDefinition {
            id: "daily_visit",
            kind: MissionKind::Daily,
            name: "Daily Walk",
            description: "Check in at a park today",
            requirements: vec![MissionRequirement {
                description: "Check in once",
                target: 1,
            }],
            reward: MissionReward {
                points: 20,
                badge_ids: &[],
                special_reward: None,
            },
            valid_from: None,
            valid_until: None,
            max_participants: None,
        },
        MissionDefinition {
            id: "weekly_explorer",
            kind: MissionKind::Weekly,
            name: "Park Explorer",
            description: "Visit 3 different parks this week",
            requirements: vec![MissionRequirement {
                description: "Visit 3 parks",
                target: 3,
            }],
            reward: MissionReward {
                points: 100,
                badge_ids: &["explorer"],
                special_reward: None,
            },
            valid_from: None,
            valid_until: None,
            max_participants: None,
        },
        MissionDefinition {
            id: "weekly_socializer",
            kind: MissionKind::Weekly,
            name: "Socializer",
            description: "Make 2 new friends and rate 1 park",
            requirements: vec![
                MissionRequirement {
                    description: "Make 2 friends",
                    target: 2,
                },
                MissionRequirement {
                    description: "Rate a park",
                    target: 1,
                },
            ],
            reward: MissionReward {
                points: 150,
                badge_ids: &[],
                special_reward: None,
            },
            valid_from: None,
            valid_until: None,
            max_participants: None,
        },
        MissionDefinition {
            id: "launch_special",
            kind: MissionKind::Special,
            name: "Grand Opening",
            description: "Check in 5 times during launch month",
            requirements: vec![MissionRequirement {
                description: "Check in 5 times",
                target: 5,
            }],
            reward: MissionReward {
                points: 500,
                badge_ids: &[],
                special_reward: Some("launch_bandana"),
            },
            valid_from: None,
            valid_until: None,
            max_participants: Some(1000),
        },
    ]
}

use serde_json::{Value, json};

/// Realtime-only gamification event frames, sent alongside (not instead
/// of) the persisted notification feed. Each variant serializes to a
/// `{type, data}` frame matching the client protocol.
#[derive(Debug, Clone)]
pub enum GamificationEvent {
    PointsUpdated {
        points: i64,
        amount: i64,
        reason: String,
    },
    LevelUp {
        level: u32,
        previous_level: u32,
        title: String,
    },
    StreakUpdated {
        streak: u32,
        previous_streak: u32,
        longest_streak: u32,
    },
    AchievementUnlocked {
        badge_id: String,
        name: String,
        rarity: String,
    },
    MissionCompleted {
        mission_id: String,
        points_awarded: i64,
    },
}

impl GamificationEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            GamificationEvent::PointsUpdated { .. } => "points_updated",
            GamificationEvent::LevelUp { .. } => "level_up",
            GamificationEvent::StreakUpdated { .. } => "streak_updated",
            GamificationEvent::AchievementUnlocked { .. } => "achievement_unlocked",
            GamificationEvent::MissionCompleted { .. } => "mission_completed",
        }
    }

    pub fn to_frame(&self) -> Value {
        let data = match self {
            GamificationEvent::PointsUpdated {
                points,
                amount,
                reason,
            } => json!({ "points": points, "amount": amount, "reason": reason }),
            GamificationEvent::LevelUp {
                level,
                previous_level,
                title,
            } => json!({ "level": level, "previous_level": previous_level, "title": title }),
            GamificationEvent::StreakUpdated {
                streak,
                previous_streak,
                longest_streak,
            } => json!({
                "streak": streak,
                "previous_streak": previous_streak,
                "longest_streak": longest_streak,
            }),
            GamificationEvent::AchievementUnlocked {
                badge_id,
                name,
                rarity,
            } => json!({ "badge_id": badge_id, "name": name, "rarity": rarity }),
            GamificationEvent::MissionCompleted {
                mission_id,
                points_awarded,
            } => json!({ "mission_id": mission_id, "points_awarded": points_awarded }),
        };

        json!({ "type": self.event_type(), "data": data })
    }
}

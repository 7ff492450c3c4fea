use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use barkpark_services::gamification::level::level_for;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let stats = state.engine.stats(auth.user_id).await?;
    Ok(Json(json!({
        "points": stats.points,
        "level": stats.level,
        "current_streak": stats.current_streak,
        "longest_streak": stats.longest_streak,
        "badge_count": stats.badge_count,
        "missions_completed": stats.missions_completed,
    })))
}

pub async fn level(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let profile = state.profiles.get_or_create(auth.user_id).await?;
    let info = level_for(state.engine.catalog(), profile.points);
    Ok(Json(json!({ "points": profile.points, "level": info })))
}

pub async fn streak(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let profile = state.profiles.get_or_create(auth.user_id).await?;
    Ok(Json(json!({
        "current_streak": profile.current_streak,
        "longest_streak": profile.longest_streak,
        "last_activity_date": profile.last_activity_date,
    })))
}

/// Earned badges joined with their catalog definitions.
pub async fn badges(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let profile = state.profiles.get_or_create(auth.user_id).await?;
    let catalog = state.engine.catalog();

    let badges: Vec<Value> = profile
        .badges
        .iter()
        .map(|earned| {
            let earned_at = earned.earned_at.try_to_rfc3339_string().unwrap_or_default();
            match catalog.badge(&earned.badge_id) {
                Some(def) => json!({
                    "badge_id": def.id,
                    "name": def.name,
                    "rarity": def.rarity,
                    "category": def.category,
                    "earned_at": earned_at,
                }),
                // Badge retired from the catalog; keep the earned row visible
                None => json!({
                    "badge_id": earned.badge_id,
                    "earned_at": earned_at,
                }),
            }
        })
        .collect();

    Ok(Json(json!({ "badges": badges })))
}

pub async fn missions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let available = state.engine.available_missions(auth.user_id).await?;

    let missions: Vec<Value> = available
        .iter()
        .map(|m| {
            let requirements: Vec<Value> = m
                .definition
                .requirements
                .iter()
                .map(|r| json!({ "description": r.description, "target": r.target }))
                .collect();

            let progress = m.user_mission.as_ref().map(|row| {
                json!({
                    "status": row.status,
                    "rewards_claimed": row.rewards_claimed,
                    "progress": row
                        .progress
                        .iter()
                        .map(|p| json!({
                            "current": p.current,
                            "target": p.target,
                            "completed": p.completed,
                        }))
                        .collect::<Vec<Value>>(),
                })
            });

            json!({
                "mission_id": m.definition.id,
                "kind": m.definition.kind,
                "name": m.definition.name,
                "description": m.definition.description,
                "requirements": requirements,
                "reward": {
                    "points": m.definition.reward.points,
                    "badge_ids": m.definition.reward.badge_ids,
                    "special_reward": m.definition.reward.special_reward,
                },
                "max_participants": m.definition.max_participants,
                "user_progress": progress,
            })
        })
        .collect();

    Ok(Json(json!({ "missions": missions })))
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub requirement_index: usize,
    #[serde(default = "default_increment")]
    pub increment_by: u32,
}

fn default_increment() -> u32 {
    1
}

pub async fn progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(mission_id): Path<String>,
    Json(body): Json<ProgressRequest>,
) -> Result<Json<Value>, ApiError> {
    let update = state
        .engine
        .mission_progress(
            auth.user_id,
            &mission_id,
            body.requirement_index,
            body.increment_by,
        )
        .await?;

    Ok(Json(json!({
        "mission_id": update.mission.mission_id,
        "status": update.mission.status,
        "newly_completed": update.newly_completed,
        "progress": update
            .mission
            .progress
            .iter()
            .map(|p| json!({
                "current": p.current,
                "target": p.target,
                "completed": p.completed,
            }))
            .collect::<Vec<Value>>(),
    })))
}

pub async fn complete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(mission_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let claim = state.engine.claim_mission(auth.user_id, &mission_id).await?;

    let badges: Vec<Value> = claim
        .badges
        .iter()
        .map(|b| {
            json!({
                "badge_id": b.badge_id,
                "name": b.name,
                "rarity": b.rarity,
                "point_reward": b.point_reward,
            })
        })
        .collect();

    Ok(Json(json!({
        "mission_id": claim.mission_id,
        "points_awarded": claim.points_awarded,
        "badges": badges,
        "special_reward": claim.special_reward,
    })))
}

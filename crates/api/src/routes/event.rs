use axum::{Json, extract::State};
use bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::{Value, json};

use barkpark_services::gamification::engine::TriggerOutcome;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct VisitEventRequest {
    pub visit_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RatingEventRequest {
    pub rating_id: String,
    #[serde(default)]
    pub is_update: bool,
}

#[derive(Debug, Deserialize)]
pub struct FriendAcceptedRequest {
    pub friend_id: String,
    pub request_id: String,
}

pub async fn checkin(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<VisitEventRequest>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state
        .engine
        .handle_check_in(auth.user_id, &body.visit_id)
        .await?;
    Ok(Json(trigger_response(outcome)))
}

pub async fn checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<VisitEventRequest>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state
        .engine
        .handle_check_out(auth.user_id, &body.visit_id)
        .await?;
    Ok(Json(trigger_response(outcome)))
}

pub async fn rating(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<RatingEventRequest>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state
        .engine
        .handle_rating(auth.user_id, &body.rating_id, body.is_update)
        .await?;
    Ok(Json(trigger_response(outcome)))
}

pub async fn friend_accepted(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<FriendAcceptedRequest>,
) -> Result<Json<Value>, ApiError> {
    let friend_id = ObjectId::parse_str(&body.friend_id)
        .map_err(|_| ApiError::BadRequest("Invalid friend_id".to_string()))?;

    let outcome = state
        .engine
        .handle_friend_accepted(auth.user_id, friend_id, &body.request_id)
        .await?;
    Ok(Json(trigger_response(outcome)))
}

/// A replayed event key reports idempotent success rather than an error.
fn trigger_response(outcome: TriggerOutcome) -> Value {
    if outcome.duplicate {
        return json!({ "duplicate": true });
    }

    let points = outcome.points.map(|p| {
        json!({
            "amount": p.amount,
            "total": p.total_after,
            "level": p.level_after.level,
            "leveled_up": p.leveled_up(),
        })
    });
    let streak = outcome.streak.map(|s| {
        json!({
            "current": s.current,
            "previous": s.previous,
            "longest": s.longest,
            "milestone": s.milestone,
        })
    });
    let badges: Vec<Value> = outcome
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

    json!({
        "duplicate": false,
        "points": points,
        "streak": streak,
        "badges": badges,
    })
}

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use barkpark_db::models::{PushKeys, PushPlatform};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(url)]
    pub endpoint: String,
    #[validate(length(min = 1))]
    pub p256dh: String,
    #[validate(length(min = 1))]
    pub auth: String,
    pub platform: PushPlatform,
}

pub async fn register(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<Value>, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let registration = state
        .push_registrations
        .register(
            user.user_id,
            body.endpoint,
            PushKeys {
                p256dh: body.p256dh,
                auth: body.auth,
            },
            body.platform,
        )
        .await?;

    Ok(Json(json!({
        "registered": true,
        "endpoint": registration.endpoint,
        "platform": registration.platform,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UnregisterRequest {
    pub endpoint: String,
}

pub async fn unregister(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<UnregisterRequest>,
) -> Result<Json<Value>, ApiError> {
    let deactivated = state
        .push_registrations
        .deactivate(user.user_id, &body.endpoint)
        .await?;
    Ok(Json(json!({ "deactivated": deactivated })))
}

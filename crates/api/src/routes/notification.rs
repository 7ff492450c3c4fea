use axum::{
    Json,
    extract::{Path, Query, State},
};
use bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::{Value, json};

use barkpark_services::dao::base::PaginationParams;
use barkpark_services::notify::NotificationWire;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    #[serde(default)]
    pub unread_only: bool,
}

pub async fn feed(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Value>, ApiError> {
    let defaults = PaginationParams::default();
    let pagination = PaginationParams {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };

    let page = state
        .notifications
        .find_feed(auth.user_id, query.unread_only, &pagination)
        .await?;

    let items: Vec<NotificationWire> =
        page.items.iter().map(NotificationWire::from_model).collect();

    Ok(Json(json!({
        "items": items,
        "total": page.total,
        "page": page.page,
        "per_page": page.per_page,
        "total_pages": page.total_pages,
    })))
}

pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let count = state.notifications.unread_count(auth.user_id).await?;
    Ok(Json(json!({ "unread": count })))
}

pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let updated = state.notifications.mark_read(auth.user_id, id).await?;
    Ok(Json(json!({ "updated": updated })))
}

#[derive(Debug, Deserialize)]
pub struct BulkReadRequest {
    pub ids: Vec<String>,
}

pub async fn mark_many_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<BulkReadRequest>,
) -> Result<Json<Value>, ApiError> {
    let ids = body
        .ids
        .iter()
        .map(|id| parse_id(id))
        .collect::<Result<Vec<ObjectId>, ApiError>>()?;

    let updated = state
        .notifications
        .mark_many_read(auth.user_id, &ids)
        .await?;
    Ok(Json(json!({ "updated": updated })))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let updated = state.notifications.mark_all_read(auth.user_id).await?;
    Ok(Json(json!({ "updated": updated })))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let deleted = state.notifications.delete(auth.user_id, id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

pub async fn delete_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let deleted = state.notifications.delete_all(auth.user_id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

fn parse_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::BadRequest("Invalid notification id".to_string()))
}

// Match schedule management. Reads are public but gated by the
// schedule_published flag; admins always see the full list.
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use super::pool;
use crate::error::ApiError;
use crate::services::schedule_service::{
    parse_match_date, parse_match_time, MatchUpdate, NewMatch,
};
use crate::services::settings_service::KEY_SCHEDULE_PUBLISHED;
use crate::services::{ScheduleService, SessionService, SettingsService};

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub published: bool,
}

/// GET /schedule/matches - bare array; empty until the schedule is
/// published, unless the caller is an admin previewing it.
pub async fn list(headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    let pool = pool().await?;
    let published = SettingsService::new(pool.clone()).schedule_published().await?;

    if !published {
        let is_admin = SessionService::new(pool.clone()).is_admin(&headers).await?;
        if !is_admin {
            return Ok(Json(json!([])));
        }
    }

    let matches = ScheduleService::new(pool).list().await?;
    Ok(Json(serde_json::to_value(matches)?))
}

/// POST /schedule/matches - admin only; unknown team names are added to
/// schedule_teams on the fly.
pub async fn create(
    headers: HeaderMap,
    Json(payload): Json<NewMatch>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = pool().await?;
    SessionService::new(pool.clone())
        .require_admin(&headers)
        .await?;

    if payload.team1_name.trim().is_empty()
        || payload.team2_name.trim().is_empty()
        || payload.round.trim().is_empty()
    {
        return Err(ApiError::bad_request("Team names and round required"));
    }

    let date = parse_match_date(&payload.match_date)
        .ok_or_else(|| ApiError::bad_request("Invalid or missing match date"))?;
    let time = parse_match_time(&payload.match_time)
        .ok_or_else(|| ApiError::bad_request("Invalid or missing match time"))?;

    let id = ScheduleService::new(pool).create(date, time, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "Match created" })),
    ))
}

/// PUT /schedule/matches/:id - admin only: result, score, stream link
pub async fn update(
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(payload): Json<MatchUpdate>,
) -> Result<Json<Value>, ApiError> {
    let pool = pool().await?;
    SessionService::new(pool.clone())
        .require_admin(&headers)
        .await?;

    if !ScheduleService::new(pool).update(id, &payload).await? {
        return Err(ApiError::not_found("Match not found"));
    }
    Ok(Json(json!({ "message": "Match updated" })))
}

/// DELETE /schedule/matches/:id - admin only
pub async fn delete(headers: HeaderMap, Path(id): Path<i32>) -> Result<Json<Value>, ApiError> {
    let pool = pool().await?;
    SessionService::new(pool.clone())
        .require_admin(&headers)
        .await?;

    if !ScheduleService::new(pool).delete(id).await? {
        return Err(ApiError::not_found("Match not found"));
    }
    Ok(Json(json!({ "message": "Match deleted" })))
}

/// DELETE /schedule/matches?clear_all=true - admin only
pub async fn clear(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let pool = pool().await?;
    SessionService::new(pool.clone())
        .require_admin(&headers)
        .await?;

    if params.get("clear_all").map(String::as_str) != Some("true") {
        return Err(ApiError::bad_request("Match ID required"));
    }

    ScheduleService::new(pool).clear().await?;
    Ok(Json(json!({ "message": "All matches cleared" })))
}

/// GET /schedule/published - public visibility check
pub async fn published() -> Result<Json<Value>, ApiError> {
    let published = SettingsService::new(pool().await?)
        .schedule_published()
        .await?;
    Ok(Json(json!({ "published": published })))
}

/// PUT /schedule/published - admin only
pub async fn set_published(
    headers: HeaderMap,
    Json(payload): Json<PublishRequest>,
) -> Result<Json<Value>, ApiError> {
    let pool = pool().await?;
    SessionService::new(pool.clone())
        .require_admin(&headers)
        .await?;

    let value = if payload.published { "true" } else { "false" };
    SettingsService::new(pool)
        .set(KEY_SCHEDULE_PUBLISHED, value)
        .await?;

    Ok(Json(json!({ "message": "Schedule publication status updated" })))
}

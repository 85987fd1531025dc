// Team registration and management: listing, registration, roster edits,
// review transitions and deletion.
use axum::extract::{Path, Query};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use super::pool;
use crate::auth;
use crate::error::ApiError;
use crate::services::team_service::Roster;
use crate::services::{PlayerService, ReviewStatus, SessionService, SettingsService, TeamService};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTeamRequest {
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub captain_nick: String,
    #[serde(default)]
    pub captain_telegram: String,
    #[serde(default)]
    pub password: String,
    #[serde(flatten)]
    pub roster: Roster,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLoginRequest {
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamRequest {
    pub team_name: Option<String>,
    #[serde(flatten)]
    pub roster: Roster,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteRequest {
    pub password: Option<String>,
}

/// GET /teams?status= - public listing, approved by default
pub async fn list(Query(params): Query<HashMap<String, String>>) -> Result<Json<Value>, ApiError> {
    let status = params
        .get("status")
        .map(String::as_str)
        .unwrap_or("approved");

    let teams = TeamService::new(pool().await?).list(status).await?;
    Ok(Json(json!({ "teams": teams })))
}

/// GET /teams/:id
pub async fn get(Path(id): Path<i32>) -> Result<Json<Value>, ApiError> {
    let team = TeamService::new(pool().await?)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Team not found"))?;
    Ok(Json(json!({ "team": team })))
}

/// POST /teams - public registration while registration_open
pub async fn register(Json(payload): Json<RegisterTeamRequest>) -> Result<Json<Value>, ApiError> {
    let team_name = payload.team_name.trim();
    if team_name.is_empty()
        || payload.captain_nick.trim().is_empty()
        || payload.captain_telegram.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(ApiError::bad_request(
            "Team name, captain nick, captain telegram and password required",
        ));
    }

    let pool = pool().await?;
    if !SettingsService::new(pool.clone()).registration_open().await? {
        return Err(ApiError::forbidden("Registration is closed"));
    }

    let team_id = TeamService::new(pool)
        .create(
            team_name,
            payload.captain_nick.trim(),
            payload.captain_telegram.trim(),
            &auth::hash_password(&payload.password),
            &payload.roster,
        )
        .await?;

    Ok(Json(json!({ "success": true, "teamId": team_id })))
}

/// POST /teams/login - profile retrieval by team name + password; no
/// session is minted, and failures are a single generic 401.
pub async fn login(Json(payload): Json<TeamLoginRequest>) -> Result<Json<Value>, ApiError> {
    let team_name = payload.team_name.trim();
    if team_name.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Team name and password required"));
    }

    let team = TeamService::new(pool().await?)
        .login(team_name, &auth::hash_password(&payload.password))
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;

    Ok(Json(json!({ "success": true, "team": team })))
}

/// PUT /teams/:id - roster edit, admin or owning captain.
///
/// The admin path may rename the team and leaves the review status alone.
/// The captain path is gated by registration_open and demotes an approved
/// team back to pending with is_edited set, forcing re-review.
pub async fn update(
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTeamRequest>,
) -> Result<Json<Value>, ApiError> {
    let pool = pool().await?;
    let sessions = SessionService::new(pool.clone());
    let teams = TeamService::new(pool.clone());

    let has_admin_token = auth::admin_token(&headers).is_some();
    let has_session_token = auth::session_token(&headers).is_some();
    if !has_admin_token && !has_session_token {
        return Err(ApiError::unauthorized("Unauthorized"));
    }

    let updated = if has_admin_token {
        sessions.require_admin(&headers).await?;
        teams
            .update_roster_as_admin(id, payload.team_name.as_deref(), &payload.roster)
            .await?
    } else {
        sessions.require_team_owner(&headers, id).await?;
        if !SettingsService::new(pool).registration_open().await? {
            return Err(ApiError::forbidden("Registration is closed"));
        }
        teams.update_roster_as_captain(id, &payload.roster).await?
    };

    let team = updated.ok_or_else(|| ApiError::not_found("Team not found"))?;
    Ok(Json(json!({ "success": true, "team": team })))
}

/// PUT /teams/:id/status - admin review transition; approval clears the
/// is_edited flag.
pub async fn set_status(
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<Value>, ApiError> {
    let pool = pool().await?;
    SessionService::new(pool.clone())
        .require_admin(&headers)
        .await?;

    let status = ReviewStatus::parse(&payload.status)
        .ok_or_else(|| ApiError::bad_request("Invalid status"))?;

    if !TeamService::new(pool).set_status(id, status).await? {
        return Err(ApiError::not_found("Team not found"));
    }
    Ok(Json(json!({ "success": true })))
}

/// DELETE /teams/:id - admin token, or self-service with the team password
pub async fn delete(
    headers: HeaderMap,
    Path(id): Path<i32>,
    payload: Option<Json<DeleteRequest>>,
) -> Result<Json<Value>, ApiError> {
    let pool = pool().await?;
    let teams = TeamService::new(pool.clone());

    if auth::admin_token(&headers).is_some() {
        SessionService::new(pool).require_admin(&headers).await?;
        if !teams.delete(id).await? {
            return Err(ApiError::not_found("Team not found"));
        }
        return Ok(Json(json!({ "success": true })));
    }

    let password = payload
        .and_then(|Json(body)| body.password)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Password required"))?;

    if !SettingsService::new(pool).registration_open().await? {
        return Err(ApiError::forbidden("Registration is closed"));
    }

    let stored_hash = teams
        .password_hash(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Team not found"))?;

    if !auth::verify_password(&password, &stored_hash) {
        return Err(ApiError::forbidden("Invalid password"));
    }

    teams.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}

/// DELETE /teams?clear_all=true - super-admin purge of every team and
/// individual registration; answers with the deletion counts.
pub async fn clear_all(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let pool = pool().await?;
    SessionService::new(pool.clone())
        .require_super_admin(&headers)
        .await?;

    if params.get("clear_all").map(String::as_str) != Some("true") {
        return Err(ApiError::bad_request("clear_all confirmation required"));
    }

    let deleted_teams = TeamService::new(pool.clone()).delete_all().await?;
    let deleted_players = PlayerService::new(pool).delete_all().await?;

    Ok(Json(json!({
        "success": true,
        "deletedTeams": deleted_teams,
        "deletedPlayers": deleted_players,
    })))
}

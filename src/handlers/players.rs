// Individual player registration and management.
use axum::extract::Path;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::pool;
use crate::auth;
use crate::error::ApiError;
use crate::services::player_service::NewPlayer;
use crate::services::{PlayerService, ReviewStatus, SessionService, SettingsService};

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteRequest {
    pub password: Option<String>,
}

/// GET /players - public listing, newest first
pub async fn list() -> Result<Json<Value>, ApiError> {
    let players = PlayerService::new(pool().await?).list().await?;
    Ok(Json(json!({ "players": players })))
}

/// POST /players - public registration while registration_open
pub async fn register(Json(payload): Json<NewPlayer>) -> Result<Json<Value>, ApiError> {
    if payload.nickname.trim().is_empty() || payload.telegram.trim().is_empty() {
        return Err(ApiError::bad_request("Nickname and telegram required"));
    }

    let pool = pool().await?;
    if !SettingsService::new(pool.clone()).registration_open().await? {
        return Err(ApiError::forbidden("Registration is closed"));
    }

    // Signups without a password keep an empty stored hash
    let password_hash = if payload.password.is_empty() {
        String::new()
    } else {
        auth::hash_password(&payload.password)
    };

    let player_id = PlayerService::new(pool)
        .create(&payload, &password_hash)
        .await?;

    Ok(Json(json!({ "success": true, "playerId": player_id })))
}

/// PUT /players/:id/status - admin review transition
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

    if !PlayerService::new(pool).set_status(id, status).await? {
        return Err(ApiError::not_found("Player not found"));
    }
    Ok(Json(json!({ "success": true })))
}

/// DELETE /players/:id - admin token, or self-service by password. Rows
/// registered without a password carry an empty hash and accept any
/// password, matching how those signups were created.
pub async fn delete(
    headers: HeaderMap,
    Path(id): Path<i32>,
    payload: Option<Json<DeleteRequest>>,
) -> Result<Json<Value>, ApiError> {
    let pool = pool().await?;
    let players = PlayerService::new(pool.clone());

    if auth::admin_token(&headers).is_some() {
        SessionService::new(pool).require_admin(&headers).await?;
        if !players.delete(id).await? {
            return Err(ApiError::not_found("Player not found"));
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

    let stored_hash = players
        .password_hash(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Player not found"))?;

    if !stored_hash.is_empty() && !auth::verify_password(&password, &stored_hash) {
        return Err(ApiError::forbidden("Invalid password"));
    }

    players.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}

// Captain/player session endpoints: login, verify, logout.
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::pool;
use crate::error::ApiError;
use crate::services::SessionService;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub telegram: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub token: String,
}

/// POST /user-auth/login
///
/// Checks team captains first, then individual players. Both "unknown
/// telegram" and "wrong password" answer with the same generic 401.
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
    let telegram = payload.telegram.trim();
    if telegram.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Telegram and password required"));
    }

    let sessions = SessionService::new(pool().await?);
    let (token, profile) = sessions.login_user(telegram, &payload.password).await?;

    let mut body = serde_json::to_value(&profile)?;
    body["success"] = json!(true);
    body["token"] = json!(token);
    Ok(Json(body))
}

/// POST /user-auth/verify
///
/// Resolves a token back to a fresh profile, so a team approved after
/// login shows its new status without re-login.
pub async fn verify(Json(payload): Json<TokenRequest>) -> Result<Json<Value>, ApiError> {
    if payload.token.is_empty() {
        return Err(ApiError::bad_request("Token required"));
    }

    let sessions = SessionService::new(pool().await?);
    let profile = sessions.verify(&payload.token).await?;

    let mut body = serde_json::to_value(&profile)?;
    body["valid"] = json!(true);
    Ok(Json(body))
}

/// POST /user-auth/logout - idempotent, succeeds even for unknown tokens
pub async fn logout(Json(payload): Json<TokenRequest>) -> Result<Json<Value>, ApiError> {
    if !payload.token.is_empty() {
        let sessions = SessionService::new(pool().await?);
        sessions.logout(&payload.token).await?;
    }
    Ok(Json(json!({ "success": true })))
}

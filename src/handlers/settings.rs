// Global key/value feature flags.
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::pool;
use crate::error::ApiError;
use crate::services::settings_service::value_to_string;
use crate::services::{SessionService, SettingsService};

#[derive(Debug, Deserialize)]
pub struct PutSettingRequest {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

/// GET /settings - public map of all flags
pub async fn list() -> Result<Json<Value>, ApiError> {
    let settings = SettingsService::new(pool().await?).all().await?;
    Ok(Json(json!({ "settings": settings })))
}

/// PUT /settings - admin only upsert; non-string values are stored as
/// their JSON encoding.
pub async fn put(
    headers: HeaderMap,
    Json(payload): Json<PutSettingRequest>,
) -> Result<Json<Value>, ApiError> {
    let pool = pool().await?;
    SessionService::new(pool.clone())
        .require_admin(&headers)
        .await?;

    if payload.key.trim().is_empty() {
        return Err(ApiError::bad_request("Setting key required"));
    }

    SettingsService::new(pool)
        .set(payload.key.trim(), &value_to_string(&payload.value))
        .await?;

    Ok(Json(json!({ "success": true })))
}

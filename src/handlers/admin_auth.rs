// Admin login and super-admin-only account management.
use axum::extract::Path;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::pool;
use crate::error::ApiError;
use crate::services::{AdminService, SessionService};
use crate::{auth, config};

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /auth/login
pub async fn login(Json(payload): Json<AdminLoginRequest>) -> Result<Json<Value>, ApiError> {
    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Username and password required"));
    }

    let sessions = SessionService::new(pool().await?);
    let (token, admin) = sessions.login_admin(username, &payload.password).await?;

    Ok(Json(json!({
        "success": true,
        "token": token,
        "username": admin.username,
        "role": admin.role,
    })))
}

/// GET /auth/admins - super admin only
pub async fn list_admins(headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    let pool = pool().await?;
    SessionService::new(pool.clone())
        .require_super_admin(&headers)
        .await?;

    let admins = AdminService::new(pool).list().await?;
    Ok(Json(json!({ "admins": admins })))
}

/// POST /auth/admins - super admin only; new accounts are plain admins
pub async fn create_admin(
    headers: HeaderMap,
    Json(payload): Json<CreateAdminRequest>,
) -> Result<Json<Value>, ApiError> {
    let pool = pool().await?;
    SessionService::new(pool.clone())
        .require_super_admin(&headers)
        .await?;

    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Username and password required"));
    }

    let admin_id = AdminService::new(pool)
        .create(username, &auth::hash_password(&payload.password))
        .await?;

    Ok(Json(json!({ "success": true, "adminId": admin_id })))
}

/// DELETE /auth/admins/:id - super admin only; the reserved super-admin
/// identity is never deletable, regardless of caller.
pub async fn delete_admin(
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let pool = pool().await?;
    SessionService::new(pool.clone())
        .require_super_admin(&headers)
        .await?;

    let admins = AdminService::new(pool);
    let target = admins
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;

    let reserved = &config::config().security.super_admin_username;
    if target.role == "super_admin" || target.username == *reserved {
        return Err(ApiError::forbidden("Cannot delete super admin"));
    }

    admins.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}

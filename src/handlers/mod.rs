// Request handlers, one module per resource family. Every mutating handler
// resolves the caller's token through SessionService before touching its
// tables; there is no shared per-request state beyond the database pool.
pub mod admin_auth;
pub mod players;
pub mod schedule;
pub mod settings;
pub mod teams;
pub mod user_auth;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use sqlx::PgPool;

use crate::database::DatabaseManager;
use crate::error::ApiError;

/// Scoped pool acquisition for a handler; missing DATABASE_URL surfaces as
/// 503 rather than a connect-time panic.
pub(crate) async fn pool() -> Result<PgPool, ApiError> {
    Ok(DatabaseManager::pool().await?)
}

/// Shared MethodRouter fallback. OPTIONS is always 200 with an empty body
/// (allow metadata comes from the CORS layer); any other unrouted method is
/// a 405 with an error body.
pub async fn method_not_allowed(method: Method) -> Response {
    if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        ApiError::method_not_allowed().into_response()
    }
}

/// Router-level fallback for paths that match nothing
pub async fn unknown_route(method: Method) -> Response {
    if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        ApiError::not_found("Route not found").into_response()
    }
}

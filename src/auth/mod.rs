use axum::http::HeaderMap;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::database::manager::DatabaseError;

/// Session principal kinds stored in the sessions table
pub const USER_TYPE_ADMIN: &str = "admin";
pub const USER_TYPE_TEAM_CAPTAIN: &str = "team_captain";
pub const USER_TYPE_INDIVIDUAL_PLAYER: &str = "individual_player";

/// Failures surfaced by login, verification and the authorization gates
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid login or password")]
    InvalidCredentials,

    #[error("Missing auth token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Unsalted sha256 hex digest.
///
/// This is a compatibility contract with the hashes already stored in the
/// database; swapping in a salted KDF invalidates every existing credential.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password) == stored_hash
}

/// Opaque URL-safe session token with 32 bytes of entropy
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Admin token header, with the legacy schedule-handler alias
pub fn admin_token(headers: &HeaderMap) -> Option<String> {
    header_value(headers, "x-auth-token").or_else(|| header_value(headers, "x-admin-token"))
}

/// Captain/player session token header
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    header_value(headers, "x-session-token")
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

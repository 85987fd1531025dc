use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::auth::{
    self, AuthError, USER_TYPE_ADMIN, USER_TYPE_INDIVIDUAL_PLAYER, USER_TYPE_TEAM_CAPTAIN,
};
use crate::config;

/// Profile resolved from a session, always fresh from the source table so
/// status changes after login are visible without re-login.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "userType")]
pub enum UserProfile {
    #[serde(rename = "team_captain", rename_all = "camelCase")]
    TeamCaptain {
        team_id: i32,
        team_name: String,
        captain_nick: String,
        team_status: String,
    },
    #[serde(rename = "individual_player", rename_all = "camelCase")]
    IndividualPlayer {
        player_id: i32,
        nickname: String,
        preferred_roles: Vec<String>,
        player_status: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminIdentity {
    pub id: i32,
    pub username: String,
    pub role: String,
}

impl AdminIdentity {
    pub fn is_super_admin(&self) -> bool {
        self.role == "super_admin"
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SessionRow {
    principal: String,
    user_type: String,
    expires_at: DateTime<Utc>,
}

fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now > expires_at
}

/// Issues, verifies and revokes opaque session tokens, and backs the
/// per-handler authorization gates.
pub struct SessionService {
    pool: PgPool,
}

impl SessionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Captain/player login. Teams are checked first, then individual
    /// players; both failures collapse into one InvalidCredentials.
    pub async fn login_user(
        &self,
        telegram: &str,
        password: &str,
    ) -> Result<(String, UserProfile), AuthError> {
        let password_hash = auth::hash_password(password);

        let team: Option<(i32, String, String, String)> = sqlx::query_as(
            "SELECT id, team_name, captain_nick, status FROM teams \
             WHERE captain_telegram = $1 AND password_hash = $2",
        )
        .bind(telegram)
        .bind(&password_hash)
        .fetch_optional(&self.pool)
        .await?;

        if let Some((id, team_name, captain_nick, status)) = team {
            let token = self.create_session(telegram, USER_TYPE_TEAM_CAPTAIN).await?;
            return Ok((
                token,
                UserProfile::TeamCaptain {
                    team_id: id,
                    team_name,
                    captain_nick,
                    team_status: status,
                },
            ));
        }

        let player: Option<(i32, String, Vec<String>, String)> = sqlx::query_as(
            "SELECT id, nickname, preferred_roles, status FROM individual_players \
             WHERE telegram = $1 AND password_hash = $2",
        )
        .bind(telegram)
        .bind(&password_hash)
        .fetch_optional(&self.pool)
        .await?;

        if let Some((id, nickname, preferred_roles, status)) = player {
            let token = self
                .create_session(telegram, USER_TYPE_INDIVIDUAL_PLAYER)
                .await?;
            return Ok((
                token,
                UserProfile::IndividualPlayer {
                    player_id: id,
                    nickname,
                    preferred_roles,
                    player_status: status,
                },
            ));
        }

        Err(AuthError::InvalidCredentials)
    }

    /// Admin login against admin_users; mints an admin-typed session.
    pub async fn login_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(String, AdminIdentity), AuthError> {
        let password_hash = auth::hash_password(password);

        let admin: Option<(i32, String, String)> = sqlx::query_as(
            "SELECT id, username, role FROM admin_users \
             WHERE username = $1 AND password_hash = $2",
        )
        .bind(username)
        .bind(&password_hash)
        .fetch_optional(&self.pool)
        .await?;

        let (id, username, role) = admin.ok_or(AuthError::InvalidCredentials)?;
        let token = self.create_session(&username, USER_TYPE_ADMIN).await?;
        Ok((token, AdminIdentity { id, username, role }))
    }

    /// Resolve a captain/player token back to a fresh profile.
    pub async fn verify(&self, token: &str) -> Result<UserProfile, AuthError> {
        let session = self.live_session(token).await?;

        match session.user_type.as_str() {
            USER_TYPE_TEAM_CAPTAIN => {
                let team: Option<(i32, String, String, String)> = sqlx::query_as(
                    "SELECT id, team_name, captain_nick, status FROM teams \
                     WHERE captain_telegram = $1",
                )
                .bind(&session.principal)
                .fetch_optional(&self.pool)
                .await?;

                let (id, team_name, captain_nick, status) =
                    team.ok_or(AuthError::InvalidToken)?;
                Ok(UserProfile::TeamCaptain {
                    team_id: id,
                    team_name,
                    captain_nick,
                    team_status: status,
                })
            }
            USER_TYPE_INDIVIDUAL_PLAYER => {
                let player: Option<(i32, String, Vec<String>, String)> = sqlx::query_as(
                    "SELECT id, nickname, preferred_roles, status FROM individual_players \
                     WHERE telegram = $1",
                )
                .bind(&session.principal)
                .fetch_optional(&self.pool)
                .await?;

                let (id, nickname, preferred_roles, status) =
                    player.ok_or(AuthError::InvalidToken)?;
                Ok(UserProfile::IndividualPlayer {
                    player_id: id,
                    nickname,
                    preferred_roles,
                    player_status: status,
                })
            }
            _ => Err(AuthError::InvalidToken),
        }
    }

    /// Delete a session. Idempotent: unknown tokens are a no-op.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Gate: any admin. Missing header is Unauthorized; a token that
    /// resolves to a non-admin session is Forbidden.
    pub async fn require_admin(&self, headers: &HeaderMap) -> Result<AdminIdentity, AuthError> {
        let token = auth::admin_token(headers).ok_or(AuthError::MissingToken)?;
        self.resolve_admin(&token).await
    }

    /// Gate: the reserved super-admin role only.
    pub async fn require_super_admin(
        &self,
        headers: &HeaderMap,
    ) -> Result<AdminIdentity, AuthError> {
        let admin = self.require_admin(headers).await?;
        if !admin.is_super_admin() {
            return Err(AuthError::Forbidden("Super admin access required".into()));
        }
        Ok(admin)
    }

    /// Non-failing admin probe, for read paths where admins see more
    /// (unpublished schedules) but everyone else still gets a response.
    pub async fn is_admin(&self, headers: &HeaderMap) -> Result<bool, AuthError> {
        match auth::admin_token(headers) {
            None => Ok(false),
            Some(token) => match self.resolve_admin(&token).await {
                Ok(_) => Ok(true),
                Err(AuthError::InvalidToken)
                | Err(AuthError::TokenExpired)
                | Err(AuthError::Forbidden(_)) => Ok(false),
                Err(other) => Err(other),
            },
        }
    }

    /// Gate: the captain owning `team_id`, via the session token header.
    pub async fn require_team_owner(
        &self,
        headers: &HeaderMap,
        team_id: i32,
    ) -> Result<(), AuthError> {
        let token = auth::session_token(headers).ok_or(AuthError::MissingToken)?;
        let session = self.live_session(&token).await?;

        if session.user_type != USER_TYPE_TEAM_CAPTAIN {
            return Err(AuthError::Forbidden("Not a team captain session".into()));
        }

        let owned: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM teams WHERE captain_telegram = $1")
                .bind(&session.principal)
                .fetch_optional(&self.pool)
                .await?;

        match owned {
            Some((id,)) if id == team_id => Ok(()),
            _ => Err(AuthError::Forbidden(
                "Insufficient permissions to edit this team".into(),
            )),
        }
    }

    async fn resolve_admin(&self, token: &str) -> Result<AdminIdentity, AuthError> {
        let session = self.live_session(token).await?;

        if session.user_type != USER_TYPE_ADMIN {
            return Err(AuthError::Forbidden("Admin access required".into()));
        }

        let admin: Option<(i32, String, String)> =
            sqlx::query_as("SELECT id, username, role FROM admin_users WHERE username = $1")
                .bind(&session.principal)
                .fetch_optional(&self.pool)
                .await?;

        let (id, username, role) = admin.ok_or(AuthError::InvalidToken)?;
        Ok(AdminIdentity { id, username, role })
    }

    /// Fetch a session and enforce expiry, deleting the row lazily when the
    /// deadline has passed so subsequent calls see InvalidToken.
    async fn live_session(&self, token: &str) -> Result<SessionRow, AuthError> {
        let session = sqlx::query_as::<_, SessionRow>(
            "SELECT principal, user_type, expires_at FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::InvalidToken)?;

        if is_expired(session.expires_at, Utc::now()) {
            sqlx::query("DELETE FROM sessions WHERE token = $1")
                .bind(token)
                .execute(&self.pool)
                .await?;
            return Err(AuthError::TokenExpired);
        }

        Ok(session)
    }

    async fn create_session(&self, principal: &str, user_type: &str) -> Result<String, AuthError> {
        let token = auth::generate_token();
        let ttl_days = config::config().security.session_ttl_days;
        let expires_at = Utc::now() + Duration::days(ttl_days);

        sqlx::query(
            "INSERT INTO sessions (principal, user_type, token, expires_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(principal)
        .bind(user_type)
        .bind(&token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expiry_is_a_strict_deadline() {
        let now = Utc::now();
        assert!(!is_expired(now + Duration::hours(1), now));
        assert!(!is_expired(now, now));
        assert!(is_expired(now - Duration::seconds(1), now));
    }

    #[test]
    fn captain_profile_serializes_to_wire_shape() {
        let profile = UserProfile::TeamCaptain {
            team_id: 7,
            team_name: "Alpha".into(),
            captain_nick: "cap".into(),
            team_status: "approved".into(),
        };
        let v = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            v,
            json!({
                "userType": "team_captain",
                "teamId": 7,
                "teamName": "Alpha",
                "captainNick": "cap",
                "teamStatus": "approved",
            })
        );
    }

    #[test]
    fn player_profile_serializes_to_wire_shape() {
        let profile = UserProfile::IndividualPlayer {
            player_id: 3,
            nickname: "solo".into(),
            preferred_roles: vec!["mid".into(), "jungle".into()],
            player_status: "pending".into(),
        };
        let v = serde_json::to_value(&profile).unwrap();
        assert_eq!(v["userType"], "individual_player");
        assert_eq!(v["playerId"], 3);
        assert_eq!(v["preferredRoles"], json!(["mid", "jungle"]));
        assert_eq!(v["playerStatus"], "pending");
    }

    #[test]
    fn super_admin_flag_follows_role() {
        let admin = AdminIdentity {
            id: 1,
            username: "ops".into(),
            role: "admin".into(),
        };
        assert!(!admin.is_super_admin());

        let root = AdminIdentity {
            id: 2,
            username: "root".into(),
            role: "super_admin".into(),
        };
        assert!(root.is_super_admin());
    }
}

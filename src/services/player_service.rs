use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::ReviewStatus;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: i32,
    pub nickname: String,
    pub telegram: String,
    pub preferred_roles: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub has_friends: bool,
    pub friend1_nickname: Option<String>,
    pub friend1_telegram: Option<String>,
    pub friend1_roles: Vec<String>,
    pub friend2_nickname: Option<String>,
    pub friend2_telegram: Option<String>,
    pub friend2_roles: Vec<String>,
}

/// Individual signup: the player, their role preferences and up to two
/// friends they want to be placed with.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub telegram: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub preferred_roles: Vec<String>,
    #[serde(default)]
    pub has_friends: bool,
    #[serde(default)]
    pub friend1_nickname: Option<String>,
    #[serde(default)]
    pub friend1_telegram: Option<String>,
    #[serde(default)]
    pub friend1_roles: Vec<String>,
    #[serde(default)]
    pub friend2_nickname: Option<String>,
    #[serde(default)]
    pub friend2_telegram: Option<String>,
    #[serde(default)]
    pub friend2_roles: Vec<String>,
}

// Friend roles are coalesced so the wire always carries arrays, even for
// rows registered before the friends fields existed.
const PLAYER_COLUMNS: &str = "id, nickname, telegram, preferred_roles, status, created_at, \
     has_friends, friend1_nickname, friend1_telegram, \
     COALESCE(friend1_roles, '{}') AS friend1_roles, \
     friend2_nickname, friend2_telegram, \
     COALESCE(friend2_roles, '{}') AS friend2_roles";

pub struct PlayerService {
    pool: PgPool,
}

impl PlayerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<PlayerRecord>, sqlx::Error> {
        sqlx::query_as::<_, PlayerRecord>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM individual_players ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create(
        &self,
        player: &NewPlayer,
        password_hash: &str,
    ) -> Result<i32, sqlx::Error> {
        // Friend blocks are only persisted when the signup opted in
        let friend1_nickname = player.friend1_nickname.as_deref().filter(|_| player.has_friends);
        let friend1_telegram = player.friend1_telegram.as_deref().filter(|_| player.has_friends);
        let friend2_nickname = player.friend2_nickname.as_deref().filter(|_| player.has_friends);
        let friend2_telegram = player.friend2_telegram.as_deref().filter(|_| player.has_friends);
        let friend1_roles = if player.has_friends { player.friend1_roles.clone() } else { vec![] };
        let friend2_roles = if player.has_friends { player.friend2_roles.clone() } else { vec![] };

        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO individual_players ( \
                 nickname, telegram, password_hash, preferred_roles, status, has_friends, \
                 friend1_nickname, friend1_telegram, friend1_roles, \
                 friend2_nickname, friend2_telegram, friend2_roles \
             ) VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7, $8, $9, $10, $11) \
             RETURNING id",
        )
        .bind(&player.nickname)
        .bind(&player.telegram)
        .bind(password_hash)
        .bind(&player.preferred_roles)
        .bind(player.has_friends)
        .bind(friend1_nickname)
        .bind(friend1_telegram)
        .bind(&friend1_roles)
        .bind(friend2_nickname)
        .bind(friend2_telegram)
        .bind(&friend2_roles)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn set_status(&self, id: i32, status: ReviewStatus) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE individual_players SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn password_hash(&self, id: i32) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM individual_players WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(hash,)| hash))
    }

    pub async fn delete(&self, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM individual_players WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM individual_players")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_record_serializes_camel_case_with_array_roles() {
        let record = PlayerRecord {
            id: 5,
            nickname: "solo".into(),
            telegram: "@solo".into(),
            preferred_roles: vec!["mid".into()],
            status: "pending".into(),
            created_at: Utc::now(),
            has_friends: true,
            friend1_nickname: Some("buddy".into()),
            friend1_telegram: Some("@buddy".into()),
            friend1_roles: vec!["support".into()],
            friend2_nickname: None,
            friend2_telegram: None,
            friend2_roles: vec![],
        };
        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["preferredRoles"], serde_json::json!(["mid"]));
        assert_eq!(v["hasFriends"], true);
        assert_eq!(v["friend1Nickname"], "buddy");
        assert_eq!(v["friend2Nickname"], serde_json::Value::Null);
        assert_eq!(v["friend2Roles"], serde_json::json!([]));
    }

    #[test]
    fn signup_defaults_make_every_field_optional() {
        let player: NewPlayer =
            serde_json::from_str(r#"{"nickname": "solo", "telegram": "@solo"}"#).unwrap();
        assert_eq!(player.nickname, "solo");
        assert!(player.password.is_empty());
        assert!(player.preferred_roles.is_empty());
        assert!(!player.has_friends);
        assert!(player.friend1_nickname.is_none());
    }
}

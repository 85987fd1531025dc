use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::ReviewStatus;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub id: i32,
    pub team_name: String,
    pub captain_nick: String,
    pub captain_telegram: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub top_nick: String,
    pub top_telegram: String,
    pub jungle_nick: String,
    pub jungle_telegram: String,
    pub mid_nick: String,
    pub mid_telegram: String,
    pub adc_nick: String,
    pub adc_telegram: String,
    pub support_nick: String,
    pub support_telegram: String,
    pub sub1_nick: String,
    pub sub1_telegram: String,
    pub sub2_nick: String,
    pub sub2_telegram: String,
    pub is_edited: bool,
}

/// Five primary roster slots plus two substitutes, nickname + contact each
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    #[serde(default)]
    pub top_nick: String,
    #[serde(default)]
    pub top_telegram: String,
    #[serde(default)]
    pub jungle_nick: String,
    #[serde(default)]
    pub jungle_telegram: String,
    #[serde(default)]
    pub mid_nick: String,
    #[serde(default)]
    pub mid_telegram: String,
    #[serde(default)]
    pub adc_nick: String,
    #[serde(default)]
    pub adc_telegram: String,
    #[serde(default)]
    pub support_nick: String,
    #[serde(default)]
    pub support_telegram: String,
    #[serde(default)]
    pub sub1_nick: String,
    #[serde(default)]
    pub sub1_telegram: String,
    #[serde(default)]
    pub sub2_nick: String,
    #[serde(default)]
    pub sub2_telegram: String,
}

const TEAM_COLUMNS: &str = "id, team_name, captain_nick, captain_telegram, status, created_at, \
     top_nick, top_telegram, jungle_nick, jungle_telegram, mid_nick, mid_telegram, \
     adc_nick, adc_telegram, support_nick, support_telegram, sub1_nick, sub1_telegram, \
     sub2_nick, sub2_telegram, is_edited";

pub struct TeamService {
    pool: PgPool,
}

impl TeamService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, status: &str) -> Result<Vec<TeamRecord>, sqlx::Error> {
        sqlx::query_as::<_, TeamRecord>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE status = $1 ORDER BY created_at DESC"
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get(&self, id: i32) -> Result<Option<TeamRecord>, sqlx::Error> {
        sqlx::query_as::<_, TeamRecord>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create(
        &self,
        team_name: &str,
        captain_nick: &str,
        captain_telegram: &str,
        password_hash: &str,
        roster: &Roster,
    ) -> Result<i32, sqlx::Error> {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO teams ( \
                 team_name, captain_nick, captain_telegram, password_hash, \
                 top_nick, top_telegram, jungle_nick, jungle_telegram, \
                 mid_nick, mid_telegram, adc_nick, adc_telegram, \
                 support_nick, support_telegram, sub1_nick, sub1_telegram, \
                 sub2_nick, sub2_telegram, status \
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                 $17, $18, 'pending') \
             RETURNING id",
        )
        .bind(team_name)
        .bind(captain_nick)
        .bind(captain_telegram)
        .bind(password_hash)
        .bind(&roster.top_nick)
        .bind(&roster.top_telegram)
        .bind(&roster.jungle_nick)
        .bind(&roster.jungle_telegram)
        .bind(&roster.mid_nick)
        .bind(&roster.mid_telegram)
        .bind(&roster.adc_nick)
        .bind(&roster.adc_telegram)
        .bind(&roster.support_nick)
        .bind(&roster.support_telegram)
        .bind(&roster.sub1_nick)
        .bind(&roster.sub1_telegram)
        .bind(&roster.sub2_nick)
        .bind(&roster.sub2_telegram)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Profile retrieval by team credentials; no session is minted here.
    pub async fn login(
        &self,
        team_name: &str,
        password_hash: &str,
    ) -> Result<Option<TeamRecord>, sqlx::Error> {
        sqlx::query_as::<_, TeamRecord>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE team_name = $1 AND password_hash = $2"
        ))
        .bind(team_name)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
    }

    /// Admin roster edit: may also rename the team, leaves status alone.
    pub async fn update_roster_as_admin(
        &self,
        id: i32,
        team_name: Option<&str>,
        roster: &Roster,
    ) -> Result<Option<TeamRecord>, sqlx::Error> {
        sqlx::query_as::<_, TeamRecord>(&format!(
            "UPDATE teams SET \
                 team_name = COALESCE($2, team_name), \
                 top_nick = $3, top_telegram = $4, jungle_nick = $5, jungle_telegram = $6, \
                 mid_nick = $7, mid_telegram = $8, adc_nick = $9, adc_telegram = $10, \
                 support_nick = $11, support_telegram = $12, sub1_nick = $13, \
                 sub1_telegram = $14, sub2_nick = $15, sub2_telegram = $16 \
             WHERE id = $1 \
             RETURNING {TEAM_COLUMNS}"
        ))
        .bind(id)
        .bind(team_name)
        .bind(&roster.top_nick)
        .bind(&roster.top_telegram)
        .bind(&roster.jungle_nick)
        .bind(&roster.jungle_telegram)
        .bind(&roster.mid_nick)
        .bind(&roster.mid_telegram)
        .bind(&roster.adc_nick)
        .bind(&roster.adc_telegram)
        .bind(&roster.support_nick)
        .bind(&roster.support_telegram)
        .bind(&roster.sub1_nick)
        .bind(&roster.sub1_telegram)
        .bind(&roster.sub2_nick)
        .bind(&roster.sub2_telegram)
        .fetch_optional(&self.pool)
        .await
    }

    /// Captain roster edit: demotes the team back to pending review and
    /// marks it edited, whatever its previous status.
    pub async fn update_roster_as_captain(
        &self,
        id: i32,
        roster: &Roster,
    ) -> Result<Option<TeamRecord>, sqlx::Error> {
        sqlx::query_as::<_, TeamRecord>(&format!(
            "UPDATE teams SET \
                 top_nick = $2, top_telegram = $3, jungle_nick = $4, jungle_telegram = $5, \
                 mid_nick = $6, mid_telegram = $7, adc_nick = $8, adc_telegram = $9, \
                 support_nick = $10, support_telegram = $11, sub1_nick = $12, \
                 sub1_telegram = $13, sub2_nick = $14, sub2_telegram = $15, \
                 status = 'pending', is_edited = true \
             WHERE id = $1 \
             RETURNING {TEAM_COLUMNS}"
        ))
        .bind(id)
        .bind(&roster.top_nick)
        .bind(&roster.top_telegram)
        .bind(&roster.jungle_nick)
        .bind(&roster.jungle_telegram)
        .bind(&roster.mid_nick)
        .bind(&roster.mid_telegram)
        .bind(&roster.adc_nick)
        .bind(&roster.adc_telegram)
        .bind(&roster.support_nick)
        .bind(&roster.support_telegram)
        .bind(&roster.sub1_nick)
        .bind(&roster.sub1_telegram)
        .bind(&roster.sub2_nick)
        .bind(&roster.sub2_telegram)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn set_status(&self, id: i32, status: ReviewStatus) -> Result<bool, sqlx::Error> {
        let result = if status.clears_edit_flag() {
            sqlx::query("UPDATE teams SET status = $2, is_edited = false WHERE id = $1")
                .bind(id)
                .bind(status.as_str())
                .execute(&self.pool)
                .await?
        } else {
            sqlx::query("UPDATE teams SET status = $2 WHERE id = $1")
                .bind(id)
                .bind(status.as_str())
                .execute(&self.pool)
                .await?
        };
        Ok(result.rows_affected() > 0)
    }

    pub async fn password_hash(&self, id: i32) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as("SELECT password_hash FROM teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(hash,)| hash))
    }

    pub async fn delete(&self, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

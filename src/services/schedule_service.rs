use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Wire format for matches is snake_case, matching what the schedule UI
/// consumes (unlike the camelCase registration records).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MatchRecord {
    pub id: i32,
    pub match_date: NaiveDate,
    pub match_time: NaiveTime,
    pub team1_name: String,
    pub team2_name: String,
    pub status: String,
    pub winner_team_id: Option<i32>,
    pub score_team1: Option<i32>,
    pub score_team2: Option<i32>,
    pub round: String,
    pub stream_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMatch {
    #[serde(default)]
    pub match_date: String,
    #[serde(default)]
    pub match_time: String,
    #[serde(default)]
    pub team1_name: String,
    #[serde(default)]
    pub team2_name: String,
    #[serde(default)]
    pub round: String,
    #[serde(default = "default_match_status")]
    pub status: String,
    #[serde(default)]
    pub stream_url: String,
}

fn default_match_status() -> String {
    "waiting".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchUpdate {
    pub status: Option<String>,
    pub winner_team_id: Option<i32>,
    pub score_team1: Option<i32>,
    pub score_team2: Option<i32>,
    #[serde(default)]
    pub stream_url: String,
}

pub fn parse_match_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn parse_match_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

const MATCH_COLUMNS: &str = "id, match_date, match_time, team1_name, team2_name, status, \
     winner_team_id, score_team1, score_team2, round, stream_url";

pub struct ScheduleService {
    pool: PgPool,
}

impl ScheduleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<MatchRecord>, sqlx::Error> {
        sqlx::query_as::<_, MatchRecord>(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches ORDER BY match_date ASC, match_time ASC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        new_match: &NewMatch,
    ) -> Result<i32, sqlx::Error> {
        let team1_id = self.get_or_create_team(&new_match.team1_name).await?;
        let team2_id = self.get_or_create_team(&new_match.team2_name).await?;

        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO matches \
                 (match_date, match_time, team1_id, team2_id, team1_name, team2_name, \
                  round, status, stream_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id",
        )
        .bind(date)
        .bind(time)
        .bind(team1_id)
        .bind(team2_id)
        .bind(&new_match.team1_name)
        .bind(&new_match.team2_name)
        .bind(&new_match.round)
        .bind(&new_match.status)
        .bind(&new_match.stream_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn update(&self, id: i32, update: &MatchUpdate) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE matches SET \
                 status = COALESCE($2, status), \
                 winner_team_id = $3, score_team1 = $4, score_team2 = $5, \
                 stream_url = $6, updated_at = CURRENT_TIMESTAMP \
             WHERE id = $1",
        )
        .bind(id)
        .bind(update.status.as_deref())
        .bind(update.winner_team_id)
        .bind(update.score_team1)
        .bind(update.score_team2)
        .bind(&update.stream_url)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn clear(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM matches").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    // Lookup-then-insert, deliberately not transactional: concurrent match
    // creation for a brand-new team name can race and surface the unique
    // violation to one caller.
    async fn get_or_create_team(&self, name: &str) -> Result<i32, sqlx::Error> {
        let existing: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM schedule_teams WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        if let Some((id,)) = existing {
            return Ok(id);
        }

        let (id,): (i32,) =
            sqlx::query_as("INSERT INTO schedule_teams (name) VALUES ($1) RETURNING id")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(id)
    }
}

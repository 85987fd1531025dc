use serde_json::Value;
use sqlx::PgPool;
use std::collections::BTreeMap;

pub const KEY_REGISTRATION_OPEN: &str = "registration_open";
pub const KEY_SCHEDULE_PUBLISHED: &str = "schedule_published";

/// Registration stays open unless the flag has been set to "false"
pub fn registration_open(value: Option<&str>) -> bool {
    value != Some("false")
}

/// The schedule is hidden unless the flag has been set to "true"
pub fn schedule_published(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Settings values are strings on the wire and in storage; structured
/// values are stored as their JSON encoding.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct SettingsService {
    pool: PgPool,
}

impl SettingsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn all(&self) -> Result<BTreeMap<String, String>, sqlx::Error> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) \
             VALUES ($1, $2, CURRENT_TIMESTAMP) \
             ON CONFLICT (key) DO UPDATE \
             SET value = EXCLUDED.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn registration_open(&self) -> Result<bool, sqlx::Error> {
        let value = self.get(KEY_REGISTRATION_OPEN).await?;
        Ok(registration_open(value.as_deref()))
    }

    pub async fn schedule_published(&self) -> Result<bool, sqlx::Error> {
        let value = self.get(KEY_SCHEDULE_PUBLISHED).await?;
        Ok(schedule_published(value.as_deref()))
    }
}

//! User Config Repository
//!
//! One JSON value per (user_id, config_key); `set` is an upsert.

use shared::models::ConfigEntry;
use sqlx::SqlitePool;

use super::RepoResult;

#[derive(sqlx::FromRow)]
struct ConfigRow {
    user_id: String,
    config_key: String,
    value: String,
    updated_at: i64,
}

impl From<ConfigRow> for ConfigEntry {
    fn from(row: ConfigRow) -> Self {
        let value = serde_json::from_str(&row.value).unwrap_or_else(|e| {
            tracing::warn!(key = %row.config_key, error = %e, "Unparsable config value, returning as string");
            serde_json::Value::String(row.value.clone())
        });
        ConfigEntry {
            user_id: row.user_id,
            config_key: row.config_key,
            value,
            updated_at: row.updated_at,
        }
    }
}

pub async fn get(
    pool: &SqlitePool,
    user_id: &str,
    key: &str,
) -> RepoResult<Option<ConfigEntry>> {
    let row = sqlx::query_as::<_, ConfigRow>(
        "SELECT user_id, config_key, value, updated_at FROM user_config \
         WHERE user_id = ? AND config_key = ?",
    )
    .bind(user_id)
    .bind(key)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(ConfigEntry::from))
}

pub async fn get_all(pool: &SqlitePool, user_id: &str) -> RepoResult<Vec<ConfigEntry>> {
    let rows = sqlx::query_as::<_, ConfigRow>(
        "SELECT user_id, config_key, value, updated_at FROM user_config \
         WHERE user_id = ? ORDER BY config_key",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(ConfigEntry::from).collect())
}

/// Upsert one (user, key) value
pub async fn set(
    pool: &SqlitePool,
    user_id: &str,
    key: &str,
    value: &serde_json::Value,
) -> RepoResult<ConfigEntry> {
    let now = shared::util::now_millis();
    let raw = value.to_string();
    sqlx::query(
        "INSERT INTO user_config (user_id, config_key, value, updated_at) VALUES (?, ?, ?, ?) \
         ON CONFLICT(user_id, config_key) DO UPDATE SET value=excluded.value, \
         updated_at=excluded.updated_at",
    )
    .bind(user_id)
    .bind(key)
    .bind(&raw)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(ConfigEntry {
        user_id: user_id.to_string(),
        config_key: key.to_string(),
        value: value.clone(),
        updated_at: now,
    })
}

pub async fn delete_all(pool: &SqlitePool, user_id: &str) -> RepoResult<u64> {
    let result = sqlx::query("DELETE FROM user_config WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

//! Price History Repository
//!
//! Append-only: rows are inserted, never updated. Deletion is explicit
//! (per id, per product, or the per-user full wipe).

use shared::models::{PriceHistory, SpecialCoefficients};
use sqlx::SqlitePool;

use super::{FETCH_ALL_LIMIT, RepoResult};

const HISTORY_COLUMNS: &str = "id, user_id, product_id, product_code, category, weight, \
     labor_cost, market_price, purity, color, wholesale_price, retail_price, \
     special_coefficients, timestamp";

const INSERT_SQL: &str = "INSERT INTO price_history (id, user_id, product_id, product_code, \
     category, weight, labor_cost, market_price, purity, color, wholesale_price, retail_price, \
     special_coefficients, timestamp) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: String,
    user_id: String,
    product_id: String,
    product_code: String,
    category: String,
    weight: f64,
    labor_cost: f64,
    market_price: f64,
    purity: String,
    color: String,
    wholesale_price: f64,
    retail_price: f64,
    special_coefficients: Option<String>,
    timestamp: i64,
}

impl From<HistoryRow> for PriceHistory {
    fn from(row: HistoryRow) -> Self {
        let special = row
            .special_coefficients
            .as_deref()
            .and_then(|raw| serde_json::from_str::<SpecialCoefficients>(raw).ok())
            .filter(|s| !s.is_empty());
        PriceHistory {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            product_code: row.product_code,
            category: row.category,
            weight: row.weight,
            labor_cost: row.labor_cost,
            market_price: row.market_price,
            purity: row.purity,
            color: row.color,
            wholesale_price: row.wholesale_price,
            retail_price: row.retail_price,
            special,
            timestamp: row.timestamp,
        }
    }
}

/// Append one snapshot (also usable inside a transaction)
pub async fn insert<'e, E>(db: E, entry: &PriceHistory) -> RepoResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let special = entry
        .special
        .as_ref()
        .filter(|s| !s.is_empty())
        .and_then(|s| serde_json::to_string(s).ok());
    sqlx::query(INSERT_SQL)
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(&entry.product_id)
        .bind(&entry.product_code)
        .bind(&entry.category)
        .bind(entry.weight)
        .bind(entry.labor_cost)
        .bind(entry.market_price)
        .bind(&entry.purity)
        .bind(&entry.color)
        .bind(entry.wholesale_price)
        .bind(entry.retail_price)
        .bind(special)
        .bind(entry.timestamp)
        .execute(db)
        .await?;
    Ok(())
}

/// 按用户查询，最新在前
pub async fn find_by_user(
    pool: &SqlitePool,
    user_id: &str,
    product_id: Option<&str>,
    skip: i64,
    limit: i64,
) -> RepoResult<Vec<PriceHistory>> {
    let mut sql = format!("SELECT {HISTORY_COLUMNS} FROM price_history WHERE user_id = ?");
    if product_id.is_some() {
        sql.push_str(" AND product_id = ?");
    }
    sql.push_str(" ORDER BY timestamp DESC LIMIT ? OFFSET ?");

    let mut q = sqlx::query_as::<_, HistoryRow>(&sql).bind(user_id);
    if let Some(pid) = product_id {
        q = q.bind(pid);
    }
    let rows = q
        .bind(limit.clamp(1, FETCH_ALL_LIMIT))
        .bind(skip.max(0))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(PriceHistory::from).collect())
}

pub async fn find_by_id(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> RepoResult<Option<PriceHistory>> {
    let sql = format!("SELECT {HISTORY_COLUMNS} FROM price_history WHERE user_id = ? AND id = ?");
    let row = sqlx::query_as::<_, HistoryRow>(&sql)
        .bind(user_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(PriceHistory::from))
}

/// 当前用户全部历史 ID（上限 FETCH_ALL_LIMIT）
pub async fn ids(pool: &SqlitePool, user_id: &str) -> RepoResult<Vec<String>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT id FROM price_history WHERE user_id = ? LIMIT ?")
            .bind(user_id)
            .bind(FETCH_ALL_LIMIT)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}

pub async fn id_exists(pool: &SqlitePool, user_id: &str, id: &str) -> RepoResult<bool> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT id FROM price_history WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

pub async fn delete_by_id(pool: &SqlitePool, user_id: &str, id: &str) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM price_history WHERE user_id = ? AND id = ?")
        .bind(user_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete every snapshot referencing one product (also usable inside the
/// catalog delete transaction)
pub async fn delete_by_product<'e, E>(db: E, user_id: &str, product_id: &str) -> RepoResult<u64>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query("DELETE FROM price_history WHERE user_id = ? AND product_id = ?")
        .bind(user_id)
        .bind(product_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_all(pool: &SqlitePool, user_id: &str) -> RepoResult<u64> {
    let result = sqlx::query("DELETE FROM price_history WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

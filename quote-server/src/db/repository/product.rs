//! Product Repository

use shared::models::{Product, ProductQuery, SpecialCoefficients};
use sqlx::SqlitePool;

use super::{FETCH_ALL_LIMIT, RepoResult};

const PRODUCT_COLUMNS: &str = "id, user_id, category, sub_category, product_code, specification, \
     weight, labor_cost, purity, color, accessory_cost, stone_cost, plating_cost, mold_cost, \
     commission, special_coefficients, market_price, wholesale_price, retail_price, created_at, \
     updated_at";

const INSERT_SQL: &str = "INSERT INTO product (id, user_id, category, sub_category, product_code, \
     specification, weight, labor_cost, purity, color, accessory_cost, stone_cost, plating_cost, \
     mold_cost, commission, special_coefficients, market_price, wholesale_price, retail_price, \
     created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

// Full overwrite of all non-identity fields, keyed on id — re-running the
// same upsert is a no-op state-wise.
const UPSERT_SQL: &str = "INSERT INTO product (id, user_id, category, sub_category, product_code, \
     specification, weight, labor_cost, purity, color, accessory_cost, stone_cost, plating_cost, \
     mold_cost, commission, special_coefficients, market_price, wholesale_price, retail_price, \
     created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
     ON CONFLICT(id) DO UPDATE SET user_id=excluded.user_id, category=excluded.category, \
     sub_category=excluded.sub_category, product_code=excluded.product_code, \
     specification=excluded.specification, weight=excluded.weight, \
     labor_cost=excluded.labor_cost, purity=excluded.purity, color=excluded.color, \
     accessory_cost=excluded.accessory_cost, stone_cost=excluded.stone_cost, \
     plating_cost=excluded.plating_cost, mold_cost=excluded.mold_cost, \
     commission=excluded.commission, special_coefficients=excluded.special_coefficients, \
     market_price=excluded.market_price, wholesale_price=excluded.wholesale_price, \
     retail_price=excluded.retail_price, created_at=excluded.created_at, \
     updated_at=excluded.updated_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    user_id: String,
    category: String,
    sub_category: String,
    product_code: String,
    specification: String,
    weight: f64,
    labor_cost: f64,
    purity: String,
    color: String,
    accessory_cost: f64,
    stone_cost: f64,
    plating_cost: f64,
    mold_cost: f64,
    commission: f64,
    special_coefficients: Option<String>,
    market_price: f64,
    wholesale_price: f64,
    retail_price: f64,
    created_at: i64,
    updated_at: i64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let special = parse_special(row.special_coefficients.as_deref(), &row.id);
        Product {
            id: row.id,
            user_id: row.user_id,
            category: row.category,
            sub_category: row.sub_category,
            product_code: row.product_code,
            specification: row.specification,
            weight: row.weight,
            labor_cost: row.labor_cost,
            purity: row.purity,
            color: row.color,
            accessory_cost: row.accessory_cost,
            stone_cost: row.stone_cost,
            plating_cost: row.plating_cost,
            mold_cost: row.mold_cost,
            commission: row.commission,
            special,
            market_price: row.market_price,
            wholesale_price: row.wholesale_price,
            retail_price: row.retail_price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// JSON 解析只发生在仓储边界；坏数据记日志后按"无特殊系数"处理
fn parse_special(raw: Option<&str>, id: &str) -> Option<SpecialCoefficients> {
    let raw = raw?;
    match serde_json::from_str::<SpecialCoefficients>(raw) {
        Ok(special) if !special.is_empty() => Some(special),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Dropping unparsable special_coefficients");
            None
        }
    }
}

fn special_json(special: Option<&SpecialCoefficients>) -> Option<String> {
    special
        .filter(|s| !s.is_empty())
        .and_then(|s| serde_json::to_string(s).ok())
}

/// 按筛选条件查询，按货号升序。货号子串匹配使用 instr (区分大小写)。
pub async fn find_by_user(
    pool: &SqlitePool,
    user_id: &str,
    query: &ProductQuery,
) -> RepoResult<Vec<Product>> {
    let mut sql = format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE user_id = ?");
    if query.category.is_some() {
        sql.push_str(" AND category = ?");
    }
    if query.sub_category.is_some() {
        sql.push_str(" AND sub_category = ?");
    }
    if query.code.is_some() {
        sql.push_str(" AND instr(product_code, ?) > 0");
    }
    if query.purity.is_some() {
        sql.push_str(" AND purity = ?");
    }
    if query.color.is_some() {
        sql.push_str(" AND color = ?");
    }
    sql.push_str(" ORDER BY product_code ASC LIMIT ? OFFSET ?");

    let mut q = sqlx::query_as::<_, ProductRow>(&sql).bind(user_id);
    if let Some(v) = &query.category {
        q = q.bind(v);
    }
    if let Some(v) = &query.sub_category {
        q = q.bind(v);
    }
    if let Some(v) = &query.code {
        q = q.bind(v);
    }
    if let Some(v) = &query.purity {
        q = q.bind(v);
    }
    if let Some(v) = &query.color {
        q = q.bind(v);
    }
    let limit = query.limit.unwrap_or(FETCH_ALL_LIMIT).clamp(1, FETCH_ALL_LIMIT);
    let skip = query.skip.unwrap_or(0).max(0);

    let rows = q.bind(limit).bind(skip).fetch_all(pool).await?;
    Ok(rows.into_iter().map(Product::from).collect())
}

pub async fn find_by_id(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> RepoResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE user_id = ? AND id = ?");
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(user_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Product::from))
}

/// 同 (user, category, code) 的全部在册行。台账保证至多一条，但替换时
/// 仍按整组删除，历史脏数据不会越积越多。
pub async fn find_by_code(
    pool: &SqlitePool,
    user_id: &str,
    category: &str,
    product_code: &str,
) -> RepoResult<Vec<Product>> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM product WHERE user_id = ? AND category = ? AND product_code = ?"
    );
    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(user_id)
        .bind(category)
        .bind(product_code)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Product::from).collect())
}

/// 当前用户全部产品 ID（上限 FETCH_ALL_LIMIT）
pub async fn ids(pool: &SqlitePool, user_id: &str) -> RepoResult<Vec<String>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT id FROM product WHERE user_id = ? LIMIT ?")
            .bind(user_id)
            .bind(FETCH_ALL_LIMIT)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}

pub async fn id_exists(pool: &SqlitePool, user_id: &str, id: &str) -> RepoResult<bool> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT id FROM product WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

/// Insert a new row (also usable inside a transaction)
pub async fn insert<'e, E>(db: E, product: &Product) -> RepoResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let special = special_json(product.special.as_ref());
    sqlx::query(INSERT_SQL)
        .bind(&product.id)
        .bind(&product.user_id)
        .bind(&product.category)
        .bind(&product.sub_category)
        .bind(&product.product_code)
        .bind(&product.specification)
        .bind(product.weight)
        .bind(product.labor_cost)
        .bind(&product.purity)
        .bind(&product.color)
        .bind(product.accessory_cost)
        .bind(product.stone_cost)
        .bind(product.plating_cost)
        .bind(product.mold_cost)
        .bind(product.commission)
        .bind(special)
        .bind(product.market_price)
        .bind(product.wholesale_price)
        .bind(product.retail_price)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(db)
        .await?;
    Ok(())
}

/// Idempotent per-id upsert: creates the row or fully overwrites every
/// non-identity field.
pub async fn upsert(pool: &SqlitePool, product: &Product) -> RepoResult<()> {
    let special = special_json(product.special.as_ref());
    sqlx::query(UPSERT_SQL)
        .bind(&product.id)
        .bind(&product.user_id)
        .bind(&product.category)
        .bind(&product.sub_category)
        .bind(&product.product_code)
        .bind(&product.specification)
        .bind(product.weight)
        .bind(product.labor_cost)
        .bind(&product.purity)
        .bind(&product.color)
        .bind(product.accessory_cost)
        .bind(product.stone_cost)
        .bind(product.plating_cost)
        .bind(product.mold_cost)
        .bind(product.commission)
        .bind(special)
        .bind(product.market_price)
        .bind(product.wholesale_price)
        .bind(product.retail_price)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(pool)
        .await?;
    Ok(())
}

/// 重算后的价格字段原地更新（保留行 ID）
pub async fn update_prices<'e, E>(
    db: E,
    user_id: &str,
    id: &str,
    market_price: f64,
    wholesale_price: f64,
    retail_price: f64,
    updated_at: i64,
) -> RepoResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "UPDATE product SET market_price = ?, wholesale_price = ?, retail_price = ?, \
         updated_at = ? WHERE user_id = ? AND id = ?",
    )
    .bind(market_price)
    .bind(wholesale_price)
    .bind(retail_price)
    .bind(updated_at)
    .bind(user_id)
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete one product row (no cascade; the catalog service owns the
/// history cascade inside its transaction)
pub async fn delete<'e, E>(db: E, user_id: &str, id: &str) -> RepoResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query("DELETE FROM product WHERE user_id = ? AND id = ?")
        .bind(user_id)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_all(pool: &SqlitePool, user_id: &str) -> RepoResult<u64> {
    let result = sqlx::query("DELETE FROM product WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

//! 产品台账服务
//!
//! 台账不变量：每个 (用户, 分类, 货号) 至多一条在册记录。录价即整行
//! 替换（旧行删除、新行新 ID 写入），每次计算都会追加一条价格历史。
//! 删除产品时在同一事务内级联删除其历史记录。

use serde::Serialize;
use sqlx::SqlitePool;

use shared::models::keys;
use shared::models::{PriceHistory, Product, ProductInput, ProductQuery, RecordFailure};
use shared::util::{now_millis, record_id};

use crate::db::repository::{config as config_repo, price_history as history_repo, product as product_repo};
use crate::pricing::{PriceCoefficients, PriceInput, PriceKind, QualityIssue, compute_price, quality_issues};
use crate::utils::{AppError, AppResult};

/// Result of one price entry: the live row, its history snapshot, and any
/// data-quality flags (flags never block the write)
#[derive(Debug, Clone, Serialize)]
pub struct RecordedPrice {
    pub product: Product,
    pub history: PriceHistory,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quality_issues: Vec<QualityIssue>,
}

/// Bulk reprice result with per-product failure isolation
#[derive(Debug, Clone, Serialize)]
pub struct RepriceReport {
    pub updated: Vec<RecordedPrice>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<RecordFailure>,
}

/// Per-user wipe result
#[derive(Debug, Clone, Serialize)]
pub struct WipeReport {
    pub products: u64,
    pub price_history: u64,
    pub config_entries: u64,
}

/// 读取用户的全局系数集；未配置时使用默认值
pub async fn load_coefficients(pool: &SqlitePool, user_id: &str) -> AppResult<PriceCoefficients> {
    match config_repo::get(pool, user_id, keys::PRICE_COEFFICIENTS).await? {
        Some(entry) => serde_json::from_value(entry.value)
            .map_err(|e| AppError::configuration(format!("Malformed priceCoefficients config: {e}"))),
        None => Ok(PriceCoefficients::default()),
    }
}

/// 读取用户配置的金价（goldPrice，存为数字）
pub async fn load_gold_price(pool: &SqlitePool, user_id: &str) -> AppResult<Option<f64>> {
    Ok(config_repo::get(pool, user_id, keys::GOLD_PRICE)
        .await?
        .and_then(|entry| entry.value.as_f64()))
}

fn history_of(product: &Product, now: i64) -> PriceHistory {
    PriceHistory {
        id: record_id(),
        user_id: product.user_id.clone(),
        product_id: product.id.clone(),
        product_code: product.product_code.clone(),
        category: product.category.clone(),
        weight: product.weight,
        labor_cost: product.labor_cost,
        market_price: product.market_price,
        purity: product.purity.clone(),
        color: product.color.clone(),
        wholesale_price: product.wholesale_price,
        retail_price: product.retail_price,
        special: product.special.clone(),
        timestamp: now,
    }
}

/// 录入/改价：按货号替换在册行并追加历史
pub async fn record_price(
    pool: &SqlitePool,
    user_id: &str,
    input: ProductInput,
) -> AppResult<RecordedPrice> {
    if input.product_code.trim().is_empty() {
        return Err(AppError::validation("product_code must not be empty"));
    }

    let coeffs = load_coefficients(pool, user_id).await?;
    let market_price = match input.market_price {
        Some(price) => price,
        None => load_gold_price(pool, user_id).await?.ok_or_else(|| {
            AppError::configuration("No market gold price configured (set goldPrice or pass market_price)")
        })?,
    };

    let resolved = coeffs.resolve(input.special.as_ref());
    let price_input = PriceInput {
        market_price,
        weight: input.weight,
        labor_cost: input.labor_cost,
        purity: &input.purity,
    };
    let wholesale_price = compute_price(&price_input, PriceKind::Wholesale, &resolved)?;
    let retail_price = compute_price(&price_input, PriceKind::Retail, &resolved)?;
    let issues = quality_issues(&price_input, &input.category, &resolved);

    let now = now_millis();
    let product = Product {
        id: record_id(),
        user_id: user_id.to_string(),
        category: input.category,
        sub_category: input.sub_category,
        product_code: input.product_code,
        specification: input.specification,
        weight: input.weight,
        labor_cost: input.labor_cost,
        purity: input.purity,
        color: input.color,
        accessory_cost: input.accessory_cost,
        stone_cost: input.stone_cost,
        plating_cost: input.plating_cost,
        mold_cost: input.mold_cost,
        commission: input.commission,
        special: input.special.filter(|s| !s.is_empty()),
        market_price,
        wholesale_price,
        retail_price,
        created_at: now,
        updated_at: now,
    };
    let history = history_of(&product, now);

    // Replace-by-code: the prior live rows go away, their history stays
    // (history cascades only on explicit product deletion).
    let prior =
        product_repo::find_by_code(pool, user_id, &product.category, &product.product_code).await?;

    let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
    for old in &prior {
        product_repo::delete(&mut *tx, user_id, &old.id).await?;
    }
    product_repo::insert(&mut *tx, &product).await?;
    history_repo::insert(&mut *tx, &history).await?;
    tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

    tracing::info!(
        user_id,
        code = %product.product_code,
        replaced = prior.len(),
        wholesale = product.wholesale_price,
        retail = product.retail_price,
        "Recorded price"
    );

    Ok(RecordedPrice {
        product,
        history,
        quality_issues: issues,
    })
}

/// 批量改价：按当前系数重算选中产品，保留行 ID，逐条追加历史。
/// 单条失败不影响其余产品。
pub async fn update_prices(
    pool: &SqlitePool,
    user_id: &str,
    ids: &[String],
    market_price_override: Option<f64>,
) -> AppResult<RepriceReport> {
    let coeffs = load_coefficients(pool, user_id).await?;
    let config_price = load_gold_price(pool, user_id).await?;

    let mut updated = Vec::new();
    let mut failed = Vec::new();

    for id in ids {
        match reprice_one(pool, user_id, id, &coeffs, market_price_override.or(config_price)).await
        {
            Ok(recorded) => updated.push(recorded),
            Err(e) => {
                tracing::warn!(user_id, product_id = %id, error = %e, "Reprice failed");
                failed.push(RecordFailure {
                    id: id.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(RepriceReport { updated, failed })
}

async fn reprice_one(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    coeffs: &PriceCoefficients,
    market_price: Option<f64>,
) -> AppResult<RecordedPrice> {
    let mut product = product_repo::find_by_id(pool, user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;

    // 没有新金价时沿用该产品上次计算所用的金价
    let market_price = market_price.unwrap_or(product.market_price);

    let resolved = coeffs.resolve(product.special.as_ref());
    let price_input = PriceInput {
        market_price,
        weight: product.weight,
        labor_cost: product.labor_cost,
        purity: &product.purity,
    };
    let wholesale_price = compute_price(&price_input, PriceKind::Wholesale, &resolved)?;
    let retail_price = compute_price(&price_input, PriceKind::Retail, &resolved)?;
    let issues = quality_issues(&price_input, &product.category, &resolved);

    let now = now_millis();
    product.market_price = market_price;
    product.wholesale_price = wholesale_price;
    product.retail_price = retail_price;
    product.updated_at = now;
    let history = history_of(&product, now);

    let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
    let touched = product_repo::update_prices(
        &mut *tx,
        user_id,
        id,
        market_price,
        wholesale_price,
        retail_price,
        now,
    )
    .await?;
    if !touched {
        return Err(AppError::not_found(format!("Product {id}")));
    }
    history_repo::insert(&mut *tx, &history).await?;
    tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

    Ok(RecordedPrice {
        product,
        history,
        quality_issues: issues,
    })
}

/// 查询在册产品
pub async fn query(
    pool: &SqlitePool,
    user_id: &str,
    filters: &ProductQuery,
) -> AppResult<Vec<Product>> {
    Ok(product_repo::find_by_user(pool, user_id, filters).await?)
}

/// 删除单个产品并级联删除其历史
pub async fn delete_product(pool: &SqlitePool, user_id: &str, id: &str) -> AppResult<bool> {
    let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
    let history_count = history_repo::delete_by_product(&mut *tx, user_id, id).await?;
    let deleted = product_repo::delete(&mut *tx, user_id, id).await?;
    tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

    if deleted {
        tracing::info!(user_id, product_id = %id, history_count, "Deleted product");
    }
    Ok(deleted)
}

/// 批量删除产品（同一事务，逐条级联历史）
pub async fn batch_delete(pool: &SqlitePool, user_id: &str, ids: &[String]) -> AppResult<u64> {
    let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
    let mut count = 0u64;
    for id in ids {
        history_repo::delete_by_product(&mut *tx, user_id, id).await?;
        if product_repo::delete(&mut *tx, user_id, id).await? {
            count += 1;
        }
    }
    tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;

    tracing::info!(user_id, requested = ids.len(), deleted = count, "Batch deleted products");
    Ok(count)
}

/// 全量清空当前用户的数据（产品、历史、配置）
pub async fn wipe_user_data(pool: &SqlitePool, user_id: &str) -> AppResult<WipeReport> {
    let products = product_repo::delete_all(pool, user_id).await?;
    let price_history = history_repo::delete_all(pool, user_id).await?;
    let config_entries = config_repo::delete_all(pool, user_id).await?;

    tracing::info!(user_id, products, price_history, config_entries, "Wiped user data");
    Ok(WipeReport {
        products,
        price_history,
        config_entries,
    })
}

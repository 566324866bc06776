//! Integration tests over a real SQLite database: ledger overwrite
//! semantics, history cascade, config upsert, and the sync flow end to end.

use quote_server::catalog;
use quote_server::db::DbService;
use quote_server::db::repository::{config as config_repo, price_history, product};
use quote_server::sync::{SqliteStore, executor};
use shared::models::{
    HistorySnapshot, LocalSnapshot, ProductInput, ProductQuery, ProductSnapshot, SyncMode,
    SyncVerdict,
};
use sqlx::SqlitePool;
use tempfile::TempDir;

const USER: &str = "user-1";

async fn test_pool() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("create temp dir");
    let db_path = dir.path().join("quote.db");
    let service = DbService::new(&db_path.to_string_lossy())
        .await
        .expect("open database");
    (dir, service.pool)
}

fn entry(code: &str) -> ProductInput {
    ProductInput {
        category: "戒指".to_string(),
        sub_category: String::new(),
        product_code: code.to_string(),
        specification: String::new(),
        weight: 2.0,
        labor_cost: 100.0,
        purity: "18K".to_string(),
        color: "黄金色".to_string(),
        accessory_cost: 0.0,
        stone_cost: 0.0,
        plating_cost: 0.0,
        mold_cost: 0.0,
        commission: 0.0,
        special: None,
        market_price: Some(500.0),
    }
}

#[tokio::test]
async fn test_record_price_computes_with_default_coefficients() {
    let (_dir, pool) = test_pool().await;

    let recorded = catalog::record_price(&pool, USER, entry("R-100")).await.unwrap();
    assert_eq!(recorded.product.wholesale_price, 313.77);
    assert_eq!(recorded.product.retail_price, 338.77);
    assert_eq!(recorded.history.product_id, recorded.product.id);
    assert!(recorded.quality_issues.is_empty());
}

#[tokio::test]
async fn test_overwrite_keeps_one_live_row_and_grows_history() {
    let (_dir, pool) = test_pool().await;

    let first = catalog::record_price(&pool, USER, entry("R-200")).await.unwrap();
    let mut second_input = entry("R-200");
    second_input.weight = 3.0;
    let second = catalog::record_price(&pool, USER, second_input).await.unwrap();

    // 台账仍只有一条在册行，且是新 ID
    let rows = catalog::query(&pool, USER, &ProductQuery::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, second.product.id);
    assert_ne!(first.product.id, second.product.id);
    assert_eq!(rows[0].weight, 3.0);

    // 历史按次累积，最新在前
    let history = price_history::find_by_user(&pool, USER, None, 0, 50).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_delete_product_cascades_its_history() {
    let (_dir, pool) = test_pool().await;

    let recorded = catalog::record_price(&pool, USER, entry("R-300")).await.unwrap();
    let deleted = catalog::delete_product(&pool, USER, &recorded.product.id).await.unwrap();
    assert!(deleted);

    let remaining = price_history::find_by_user(&pool, USER, Some(recorded.product.id.as_str()), 0, 50)
        .await
        .unwrap();
    assert!(remaining.is_empty());
    assert!(product::find_by_id(&pool, USER, &recorded.product.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_queries_are_scoped_by_user() {
    let (_dir, pool) = test_pool().await;

    catalog::record_price(&pool, USER, entry("R-400")).await.unwrap();
    let other = catalog::query(&pool, "someone-else", &ProductQuery::default()).await.unwrap();
    assert!(other.is_empty());
}

#[tokio::test]
async fn test_code_substring_filter_is_case_sensitive() {
    let (_dir, pool) = test_pool().await;

    catalog::record_price(&pool, USER, entry("AB-100")).await.unwrap();
    catalog::record_price(&pool, USER, entry("ab-200")).await.unwrap();

    let filters = ProductQuery {
        code: Some("AB".to_string()),
        ..Default::default()
    };
    let rows = catalog::query(&pool, USER, &filters).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].product_code, "AB-100");
}

#[tokio::test]
async fn test_config_set_is_upsert() {
    let (_dir, pool) = test_pool().await;

    config_repo::set(&pool, USER, "goldPrice", &serde_json::json!(480.0)).await.unwrap();
    config_repo::set(&pool, USER, "goldPrice", &serde_json::json!(505.5)).await.unwrap();

    let stored = config_repo::get(&pool, USER, "goldPrice").await.unwrap().unwrap();
    assert_eq!(stored.value, serde_json::json!(505.5));
    assert_eq!(config_repo::get_all(&pool, USER).await.unwrap().len(), 1);

    // 录价未传金价时取配置值
    let mut input = entry("R-500");
    input.market_price = None;
    let recorded = catalog::record_price(&pool, USER, input).await.unwrap();
    assert_eq!(recorded.product.market_price, 505.5);
}

#[tokio::test]
async fn test_sync_then_verify_converges() {
    let (_dir, pool) = test_pool().await;
    let store = SqliteStore::new(pool.clone());

    let snapshot = LocalSnapshot {
        products: vec![
            ProductSnapshot {
                id: Some("cache-p1".to_string()),
                product_code: Some("E-001".to_string()),
                category: Some("耳环/耳逼".to_string()),
                weight: Some(1.2),
                purity: Some("14K".to_string()),
                ..Default::default()
            },
            ProductSnapshot {
                id: Some("cache-p2".to_string()),
                product_code: Some("E-002".to_string()),
                ..Default::default()
            },
        ],
        price_history: vec![HistorySnapshot {
            id: Some("cache-h1".to_string()),
            product_id: Some("cache-p1".to_string()),
            product_code: Some("E-001".to_string()),
            wholesale_price: Some(120.5),
            timestamp: Some(1_700_000_000_000),
            ..Default::default()
        }],
    };

    // 首次同步：全部推送
    let report = executor::run(&store, USER, &snapshot, SyncMode::Sync).await.unwrap();
    assert_eq!(report.products.counts.created, 2);
    assert_eq!(report.price_history.counts.created, 1);
    assert!(report.is_clean());

    // 缺省字段已在写前补零
    let stored = product::find_by_id(&pool, USER, "cache-p2").await.unwrap().unwrap();
    assert_eq!(stored.weight, 0.0);
    assert_eq!(stored.category, "");

    // 重跑同步：幂等，无新建
    let rerun = executor::run(&store, USER, &snapshot, SyncMode::Sync).await.unwrap();
    assert_eq!(rerun.products.counts.created, 0);
    assert_eq!(rerun.products.counts.updated, 2);
    assert_eq!(rerun.price_history.counts.created, 0);

    // 校验模式：双方一致
    let verify = executor::run(&store, USER, &snapshot, SyncMode::Verify).await.unwrap();
    assert_eq!(verify.products.verdict, SyncVerdict::FullyMatched);
    assert_eq!(verify.price_history.verdict, SyncVerdict::FullyMatched);
    assert!(verify.products.missing_remote.is_empty());
}

#[tokio::test]
async fn test_wipe_clears_everything() {
    let (_dir, pool) = test_pool().await;

    catalog::record_price(&pool, USER, entry("R-600")).await.unwrap();
    config_repo::set(&pool, USER, "dataVersion", &serde_json::json!("v3")).await.unwrap();

    let report = catalog::wipe_user_data(&pool, USER).await.unwrap();
    assert_eq!(report.products, 1);
    assert_eq!(report.price_history, 1);
    assert_eq!(report.config_entries, 1);

    assert!(catalog::query(&pool, USER, &ProductQuery::default()).await.unwrap().is_empty());
    assert!(price_history::find_by_user(&pool, USER, None, 0, 10).await.unwrap().is_empty());
}

//! Sync 执行器与存储协作方边界
//!
//! [`RemoteStore`] 是对账核心对存储的全部要求；SQLite 实现之外，测试用
//! 内存实现注入故障。执行器逐条顺序下发写操作：跨货号没有先后依赖，
//! 同一 ID 的写入天然按提交顺序后写覆盖。中途中止不回滚已提交的
//! upsert（幂等重放会收敛）。

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::SqlitePool;

use shared::models::{
    EntityReport, IdentityAnomaly, LocalSnapshot, PriceHistory, Product, ReconcileReport,
    RecordFailure, SyncCounts, SyncMode, SyncOutcome,
};
use shared::util::now_millis;

use crate::db::repository::{RepoResult, price_history as history_repo, product as product_repo};
use crate::sync::normalize::{normalize_history, normalize_product};
use crate::sync::reconcile;
use crate::utils::{AppError, AppResult};

/// 存储协作方边界。ID 集读取在底层分页，这里以足够大的上限一次取全。
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn product_ids(&self, user_id: &str) -> RepoResult<Vec<String>>;
    async fn history_ids(&self, user_id: &str) -> RepoResult<Vec<String>>;
    /// 按 ID 幂等 upsert：不存在则建，存在则整行覆盖非身份字段
    async fn upsert_product(&self, product: &Product) -> RepoResult<()>;
    /// 只追加，从不覆盖已有行
    async fn insert_history(&self, entry: &PriceHistory) -> RepoResult<()>;
    async fn find_history(&self, user_id: &str, id: &str) -> RepoResult<Option<PriceHistory>>;
    async fn product_id_exists(&self, user_id: &str, id: &str) -> RepoResult<bool>;
    async fn history_id_exists(&self, user_id: &str, id: &str) -> RepoResult<bool>;
}

/// 服务端 SQLite 存储
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn product_ids(&self, user_id: &str) -> RepoResult<Vec<String>> {
        product_repo::ids(&self.pool, user_id).await
    }

    async fn history_ids(&self, user_id: &str) -> RepoResult<Vec<String>> {
        history_repo::ids(&self.pool, user_id).await
    }

    async fn upsert_product(&self, product: &Product) -> RepoResult<()> {
        product_repo::upsert(&self.pool, product).await
    }

    async fn insert_history(&self, entry: &PriceHistory) -> RepoResult<()> {
        history_repo::insert(&self.pool, entry).await
    }

    async fn find_history(&self, user_id: &str, id: &str) -> RepoResult<Option<PriceHistory>> {
        history_repo::find_by_id(&self.pool, user_id, id).await
    }

    async fn product_id_exists(&self, user_id: &str, id: &str) -> RepoResult<bool> {
        product_repo::id_exists(&self.pool, user_id, id).await
    }

    async fn history_id_exists(&self, user_id: &str, id: &str) -> RepoResult<bool> {
        history_repo::id_exists(&self.pool, user_id, id).await
    }
}

/// 执行一次对账。
///
/// Verify 只读：求差、分类、报告；Sync 把客户端独有的记录推入存储。
/// 存储端 ID 集读取失败对整个调用致命；单条写失败只计入报告。
pub async fn run(
    store: &dyn RemoteStore,
    user_id: &str,
    snapshot: &LocalSnapshot,
    mode: SyncMode,
) -> AppResult<ReconcileReport> {
    let now = now_millis();

    // 写前规整：验证失败的记录在此淘汰，计入 failed
    let mut products = Vec::new();
    let mut product_failures = Vec::new();
    for raw in &snapshot.products {
        match normalize_product(user_id, raw, now) {
            Ok(product) => products.push(product),
            Err(failure) => product_failures.push(failure),
        }
    }

    let mut history_entries = Vec::new();
    let mut history_failures = Vec::new();
    for raw in &snapshot.price_history {
        match normalize_history(user_id, raw, now) {
            Ok(entry) => history_entries.push(entry),
            Err(failure) => history_failures.push(failure),
        }
    }

    // 远端快照读取失败 → 整体终止
    let remote_products: HashSet<String> = store
        .product_ids(user_id)
        .await
        .map_err(|e| AppError::repository_unavailable(e.to_string()))?
        .into_iter()
        .collect();
    let remote_history: HashSet<String> = store
        .history_ids(user_id)
        .await
        .map_err(|e| AppError::repository_unavailable(e.to_string()))?
        .into_iter()
        .collect();

    let products_report =
        sync_products(store, &products, product_failures, &remote_products, mode).await;
    let history_report = sync_history(
        store,
        user_id,
        &history_entries,
        history_failures,
        &remote_history,
        mode,
    )
    .await;

    tracing::info!(
        user_id,
        mode = ?mode,
        products_created = products_report.counts.created,
        products_updated = products_report.counts.updated,
        products_failed = products_report.counts.failed,
        history_created = history_report.counts.created,
        history_failed = history_report.counts.failed,
        "Reconciliation finished"
    );

    Ok(ReconcileReport {
        mode,
        products: products_report,
        price_history: history_report,
        ran_at: now,
    })
}

async fn sync_products(
    store: &dyn RemoteStore,
    records: &[Product],
    rejected: Vec<RecordFailure>,
    remote_ids: &HashSet<String>,
    mode: SyncMode,
) -> EntityReport {
    let local_ids: HashSet<String> = records.iter().map(|p| p.id.clone()).collect();
    let diff = reconcile::diff(&local_ids, remote_ids);

    let mut counts = SyncCounts::default();
    let mut failures = rejected;
    for _ in &failures {
        counts.record(SyncOutcome::Failed);
    }

    match mode {
        SyncMode::Verify => {
            for _ in records {
                counts.record(SyncOutcome::Skipped);
            }
        }
        SyncMode::Sync => {
            for product in records {
                let existed = remote_ids.contains(&product.id);
                match store.upsert_product(product).await {
                    Ok(()) => counts.record(if existed {
                        SyncOutcome::Updated
                    } else {
                        SyncOutcome::Created
                    }),
                    Err(e) => {
                        tracing::warn!(product_id = %product.id, error = %e, "Product upsert failed");
                        counts.record(SyncOutcome::Failed);
                        failures.push(RecordFailure {
                            id: product.id.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    EntityReport {
        verdict: diff.verdict(),
        local_count: diff.local_count,
        remote_count: diff.remote_count,
        missing_remote: diff.missing_remote,
        missing_local: diff.missing_local,
        counts,
        failures,
        anomalies: vec![],
    }
}

/// 历史为只追加实体：已有同 ID 的远端行从不更新，内容不一致记异常
fn same_history_content(a: &PriceHistory, b: &PriceHistory) -> bool {
    const EPS: f64 = 0.01;
    a.product_id == b.product_id
        && a.product_code == b.product_code
        && (a.weight - b.weight).abs() < EPS
        && (a.labor_cost - b.labor_cost).abs() < EPS
        && (a.market_price - b.market_price).abs() < EPS
        && (a.wholesale_price - b.wholesale_price).abs() < EPS
        && (a.retail_price - b.retail_price).abs() < EPS
        && a.timestamp == b.timestamp
}

async fn sync_history(
    store: &dyn RemoteStore,
    user_id: &str,
    records: &[PriceHistory],
    rejected: Vec<RecordFailure>,
    remote_ids: &HashSet<String>,
    mode: SyncMode,
) -> EntityReport {
    let local_ids: HashSet<String> = records.iter().map(|h| h.id.clone()).collect();
    let diff = reconcile::diff(&local_ids, remote_ids);

    let mut counts = SyncCounts::default();
    let mut failures = rejected;
    for _ in &failures {
        counts.record(SyncOutcome::Failed);
    }
    let mut anomalies = Vec::new();

    match mode {
        SyncMode::Verify => {
            for _ in records {
                counts.record(SyncOutcome::Skipped);
            }
        }
        SyncMode::Sync => {
            for entry in records {
                if remote_ids.contains(&entry.id) {
                    match store.find_history(user_id, &entry.id).await {
                        Ok(Some(remote)) if !same_history_content(entry, &remote) => {
                            tracing::warn!(history_id = %entry.id, "History id collision with different content");
                            counts.record(SyncOutcome::Skipped);
                            anomalies.push(IdentityAnomaly {
                                id: entry.id.clone(),
                                detail: "Remote row with the same id has different content"
                                    .to_string(),
                            });
                        }
                        Ok(_) => counts.record(SyncOutcome::Skipped),
                        Err(e) => {
                            counts.record(SyncOutcome::Failed);
                            failures.push(RecordFailure {
                                id: entry.id.clone(),
                                message: e.to_string(),
                            });
                        }
                    }
                } else {
                    match store.insert_history(entry).await {
                        Ok(()) => counts.record(SyncOutcome::Created),
                        Err(e) => {
                            tracing::warn!(history_id = %entry.id, error = %e, "History insert failed");
                            counts.record(SyncOutcome::Failed);
                            failures.push(RecordFailure {
                                id: entry.id.clone(),
                                message: e.to_string(),
                            });
                        }
                    }
                }
            }
        }
    }

    EntityReport {
        verdict: diff.verdict(),
        local_count: diff.local_count,
        remote_count: diff.remote_count,
        missing_remote: diff.missing_remote,
        missing_local: diff.missing_local,
        counts,
        failures,
        anomalies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::mock::MockStore;
    use shared::models::{HistorySnapshot, ProductSnapshot, SyncVerdict};

    const USER: &str = "u1";

    fn product_snap(id: &str, code: &str) -> ProductSnapshot {
        ProductSnapshot {
            id: Some(id.to_string()),
            product_code: Some(code.to_string()),
            category: Some("戒指".to_string()),
            weight: Some(2.0),
            labor_cost: Some(100.0),
            purity: Some("18K".to_string()),
            ..Default::default()
        }
    }

    fn history_snap(id: &str) -> HistorySnapshot {
        HistorySnapshot {
            id: Some(id.to_string()),
            product_id: Some("p1".to_string()),
            product_code: Some("E-001".to_string()),
            wholesale_price: Some(313.77),
            timestamp: Some(1_700_000_000_000),
            ..Default::default()
        }
    }

    fn seeded_product(store: &MockStore, id: &str, code: &str) {
        let product = normalize_product(USER, &product_snap(id, code), 0).unwrap();
        store
            .products
            .lock()
            .unwrap()
            .insert(id.to_string(), product);
    }

    #[tokio::test]
    async fn test_verify_reports_without_writing() {
        let store = MockStore::new();
        seeded_product(&store, "a", "E-001");

        let snapshot = LocalSnapshot {
            products: vec![product_snap("a", "E-001"), product_snap("b", "E-002")],
            price_history: vec![],
        };

        let report = run(&store, USER, &snapshot, SyncMode::Verify).await.unwrap();
        assert_eq!(report.products.verdict, SyncVerdict::LocalAhead);
        assert_eq!(report.products.missing_remote, vec!["b".to_string()]);
        assert_eq!(report.products.counts.skipped, 2);
        assert_eq!(report.products.counts.created, 0);
        assert!(store.write_log.lock().unwrap().is_empty());
        assert_eq!(report.price_history.verdict, SyncVerdict::BothEmpty);
    }

    #[tokio::test]
    async fn test_sync_creates_missing_and_updates_present() {
        let store = MockStore::new();
        seeded_product(&store, "a", "E-001");

        let snapshot = LocalSnapshot {
            products: vec![product_snap("a", "E-001"), product_snap("b", "E-002")],
            price_history: vec![history_snap("h1")],
        };

        let report = run(&store, USER, &snapshot, SyncMode::Sync).await.unwrap();
        assert_eq!(report.products.counts.created, 1);
        assert_eq!(report.products.counts.updated, 1);
        assert_eq!(report.products.counts.failed, 0);
        assert_eq!(report.price_history.counts.created, 1);
        assert!(store.products.lock().unwrap().contains_key("b"));
        assert!(store.history.lock().unwrap().contains_key("h1"));
    }

    #[tokio::test]
    async fn test_second_sync_run_is_idempotent() {
        let store = MockStore::new();
        let snapshot = LocalSnapshot {
            products: vec![product_snap("a", "E-001"), product_snap("b", "E-002")],
            price_history: vec![history_snap("h1")],
        };

        run(&store, USER, &snapshot, SyncMode::Sync).await.unwrap();
        let after_first: Vec<String> = {
            let mut ids: Vec<String> = store.products.lock().unwrap().keys().cloned().collect();
            ids.sort();
            ids
        };

        let report = run(&store, USER, &snapshot, SyncMode::Sync).await.unwrap();
        // 第二遍没有 create；update 对状态是无操作
        assert_eq!(report.products.counts.created, 0);
        assert_eq!(report.products.counts.updated, 2);
        assert_eq!(report.price_history.counts.created, 0);
        assert_eq!(report.price_history.counts.skipped, 1);

        let after_second: Vec<String> = {
            let mut ids: Vec<String> = store.products.lock().unwrap().keys().cloned().collect();
            ids.sort();
            ids
        };
        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn test_partial_failure_does_not_abort_batch() {
        let mut store = MockStore::new();
        store.fail_ids.insert("b".to_string());

        let snapshot = LocalSnapshot {
            products: vec![
                product_snap("a", "E-001"),
                product_snap("b", "E-002"),
                product_snap("c", "E-003"),
            ],
            price_history: vec![],
        };

        let report = run(&store, USER, &snapshot, SyncMode::Sync).await.unwrap();
        assert_eq!(report.products.counts.created, 2);
        assert_eq!(report.products.counts.failed, 1);
        assert_eq!(report.products.counts.total(), 3);
        assert_eq!(report.products.failures.len(), 1);
        assert_eq!(report.products.failures[0].id, "b");
        // b 之后的 c 仍被尝试
        assert_eq!(store.write_log.lock().unwrap().len(), 3);
        assert!(store.products.lock().unwrap().contains_key("c"));
    }

    #[tokio::test]
    async fn test_validation_gate_blocks_write_but_counts_failure() {
        let store = MockStore::new();
        let mut bad = product_snap("", "E-009");
        bad.id = None;

        let snapshot = LocalSnapshot {
            products: vec![bad, product_snap("a", "E-001")],
            price_history: vec![],
        };

        let report = run(&store, USER, &snapshot, SyncMode::Sync).await.unwrap();
        assert_eq!(report.products.counts.failed, 1);
        assert_eq!(report.products.counts.created, 1);
        assert_eq!(report.products.counts.total(), 2);
        // 被拒记录从未到达存储
        assert_eq!(*store.write_log.lock().unwrap(), ["a"]);
        assert_eq!(report.products.failures[0].id, "E-009");
    }

    #[tokio::test]
    async fn test_history_id_collision_reported_not_resolved() {
        let store = MockStore::new();
        let remote = normalize_history(USER, &history_snap("h1"), 0).unwrap();
        store
            .history
            .lock()
            .unwrap()
            .insert("h1".to_string(), remote.clone());

        // 同 ID 不同内容
        let mut conflicting = history_snap("h1");
        conflicting.wholesale_price = Some(999.99);

        let snapshot = LocalSnapshot {
            products: vec![],
            price_history: vec![conflicting],
        };

        let report = run(&store, USER, &snapshot, SyncMode::Sync).await.unwrap();
        assert_eq!(report.price_history.counts.skipped, 1);
        assert_eq!(report.price_history.anomalies.len(), 1);
        assert_eq!(report.price_history.anomalies[0].id, "h1");
        // 远端内容保持不变
        let kept = store.history.lock().unwrap().get("h1").cloned().unwrap();
        assert_eq!(kept.wholesale_price, remote.wholesale_price);
    }

    #[tokio::test]
    async fn test_identical_history_is_skipped_silently() {
        let store = MockStore::new();
        let remote = normalize_history(USER, &history_snap("h1"), 0).unwrap();
        store.history.lock().unwrap().insert("h1".to_string(), remote);

        let snapshot = LocalSnapshot {
            products: vec![],
            price_history: vec![history_snap("h1")],
        };

        let report = run(&store, USER, &snapshot, SyncMode::Sync).await.unwrap();
        assert_eq!(report.price_history.counts.skipped, 1);
        assert!(report.price_history.anomalies.is_empty());
    }

    #[tokio::test]
    async fn test_remote_read_failure_is_fatal() {
        let mut store = MockStore::new();
        store.fail_reads = true;

        let snapshot = LocalSnapshot {
            products: vec![product_snap("a", "E-001")],
            price_history: vec![],
        };

        let err = run(&store, USER, &snapshot, SyncMode::Sync).await.unwrap_err();
        assert!(matches!(err, AppError::RepositoryUnavailable(_)));
        assert!(store.write_log.lock().unwrap().is_empty());
    }
}

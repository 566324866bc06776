//! 缺失 ID 诊断（只读）
//!
//! 对每个本地有、远端疑似没有的 ID 给出启发式解释：若远端存在该 ID
//! 的定长前缀行，说明远端身份列曾窄于 ID 格式、写入时被静默截断，
//! 标记 likely-truncated；否则 not-found。诊断从不修改数据。

use shared::models::{DiagnosticReport, MissingIdFinding, MissingIdReport};
use shared::util::now_millis;

use crate::sync::RemoteStore;
use crate::utils::{AppError, AppResult};

/// 截断探测前缀长度。早期远端身份列的宽度，窄于 [`shared::util::MAX_ID_LEN`]。
pub const TRUNCATED_ID_LEN: usize = 32;

enum Entity {
    Product,
    History,
}

async fn exists(
    store: &dyn RemoteStore,
    entity: &Entity,
    user_id: &str,
    id: &str,
) -> AppResult<bool> {
    let found = match entity {
        Entity::Product => store.product_id_exists(user_id, id).await,
        Entity::History => store.history_id_exists(user_id, id).await,
    };
    found.map_err(|e| AppError::repository_unavailable(e.to_string()))
}

async fn classify(
    store: &dyn RemoteStore,
    entity: Entity,
    user_id: &str,
    candidates: &[String],
) -> AppResult<Vec<MissingIdReport>> {
    let mut reports = Vec::with_capacity(candidates.len());
    for id in candidates {
        let finding = if exists(store, &entity, user_id, id).await? {
            MissingIdFinding::Present
        } else if let Some(prefix) = id.get(..TRUNCATED_ID_LEN).filter(|p| p.len() < id.len()) {
            if exists(store, &entity, user_id, prefix).await? {
                MissingIdFinding::LikelyTruncated {
                    remote_id: prefix.to_string(),
                }
            } else {
                MissingIdFinding::NotFound
            }
        } else {
            MissingIdFinding::NotFound
        };
        reports.push(MissingIdReport {
            id: id.clone(),
            finding,
        });
    }
    Ok(reports)
}

/// 逐个解释候选 ID 为何远端找不到
pub async fn diagnose_missing(
    store: &dyn RemoteStore,
    user_id: &str,
    product_ids: &[String],
    history_ids: &[String],
) -> AppResult<DiagnosticReport> {
    let products = classify(store, Entity::Product, user_id, product_ids).await?;
    let price_history = classify(store, Entity::History, user_id, history_ids).await?;

    let truncated = products
        .iter()
        .chain(price_history.iter())
        .filter(|r| matches!(r.finding, MissingIdFinding::LikelyTruncated { .. }))
        .count();
    if truncated > 0 {
        tracing::warn!(user_id, truncated, "Diagnosis found likely-truncated ids");
    }

    Ok(DiagnosticReport {
        products,
        price_history,
        ran_at: now_millis(),
    })
}

//! 对账核心：纯集合运算
//!
//! 与存储无关、无状态，对每种实体独立运行。三个分区两两不相交且覆盖
//! 双方全集：missing_remote ∪ matched == local，missing_local ∪ matched
//! == remote。

use std::collections::HashSet;

use shared::models::SyncVerdict;

/// 双方 ID 集的差集结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetDiff {
    /// 客户端有、存储没有（需要推送）
    pub missing_remote: Vec<String>,
    /// 存储有、客户端没有（仅报告，不自动回拉）
    pub missing_local: Vec<String>,
    /// 双方都有
    pub matched: Vec<String>,
    pub local_count: usize,
    pub remote_count: usize,
}

/// 求差。输出各列表排序，报告稳定可比。
pub fn diff(local: &HashSet<String>, remote: &HashSet<String>) -> SetDiff {
    let mut missing_remote: Vec<String> = local.difference(remote).cloned().collect();
    let mut missing_local: Vec<String> = remote.difference(local).cloned().collect();
    let mut matched: Vec<String> = local.intersection(remote).cloned().collect();
    missing_remote.sort();
    missing_local.sort();
    matched.sort();

    SetDiff {
        missing_remote,
        missing_local,
        matched,
        local_count: local.len(),
        remote_count: remote.len(),
    }
}

impl SetDiff {
    /// 状态分类，按固定顺序判定：
    /// 双方皆空 → both-empty；客户端有独有记录 → local-ahead；
    /// 存储是客户端的真超集 → remote-ahead；否则 fully-matched。
    pub fn verdict(&self) -> SyncVerdict {
        if self.local_count == 0 && self.remote_count == 0 {
            SyncVerdict::BothEmpty
        } else if !self.missing_remote.is_empty() {
            SyncVerdict::LocalAhead
        } else if !self.missing_local.is_empty() {
            SyncVerdict::RemoteAhead
        } else {
            SyncVerdict::FullyMatched
        }
    }
}

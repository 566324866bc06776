//! 对账与同步引擎
//!
//! 客户端缓存与服务端存储的三态对账：
//!
//! - [`reconcile`] - 纯集合运算：双方 ID 集求差与状态分类
//! - [`normalize`] - 写前规整：缺省字段补默认值，缺 ID/货号整条拒绝
//! - [`executor`] - [`RemoteStore`] 存储边界 + verify/sync 执行器
//! - [`diagnose`] - 只读的缺失 ID 诊断（截断 ID 启发式）
//!
//! Verify 模式只读出报告；Sync 模式把客户端独有的记录推入存储，单条
//! 失败不中断批次。产品按 ID 幂等 upsert；价格历史只追加，同 ID 不同
//! 内容记为异常，不自动消解。

pub mod diagnose;
pub mod executor;
pub mod normalize;
pub mod reconcile;

pub use executor::{RemoteStore, SqliteStore, run};

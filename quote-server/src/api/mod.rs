//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`pricing`] - 试算接口（只算不存）
//! - [`products`] - 产品台账接口
//! - [`history`] - 价格历史接口
//! - [`config`] - 用户配置接口（含全量清空）
//! - [`sync`] - 对账/同步/诊断接口

pub mod config;
pub mod health;
pub mod history;
pub mod pricing;
pub mod products;
pub mod sync;

use axum::Router;

use crate::core::ServerState;

/// 汇总全部资源路由
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(pricing::router())
        .merge(products::router())
        .merge(history::router())
        .merge(config::router())
        .merge(sync::router())
}

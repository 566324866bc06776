//! Quote Server - 金饰报价与同步服务
//!
//! # 架构概述
//!
//! 单体服务端：计价、台账、历史与对账核心，SQLite 持久化。
//!
//! - **计价** (`pricing`): 系数集 + 纯函数价格计算
//! - **台账** (`catalog`): 每个货号一条在册记录，改价即整行替换
//! - **对账** (`sync`): 本地缓存与服务端存储的三态对账引擎
//! - **数据库** (`db`): SQLite (WAL) + sqlx 仓储层
//! - **认证** (`auth`): JWT Bearer 校验 (只验不发)
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! quote-server/src/
//! ├── core/          # 配置、状态
//! ├── utils/         # 错误、日志
//! ├── auth/          # JWT 认证
//! ├── db/            # 数据库层
//! ├── pricing/       # 价格计算
//! ├── catalog/       # 产品台账服务
//! ├── sync/          # 对账与同步引擎
//! └── api/           # HTTP 路由和处理器
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod db;
pub mod pricing;
pub mod sync;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, ServerState};
pub use utils::{AppError, AppResult};
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   ______      __    __   ____              __
  / ____/___  / /___/ /  / __ \__  ______  / /____
 / / __/ __ \/ / __  /  / / / / / / / __ \/ __/ _ \
/ /_/ / /_/ / / /_/ /  / /_/ / /_/ / /_/ / /_/  __/
\____/\____/_/\__,_/   \___\_\__,_/\____/\__/\___/
    "#
    );
}

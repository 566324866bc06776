//! 计价模块
//!
//! - [`PriceCoefficients`] - 全局系数集（按用户存于 `priceCoefficients` 配置）
//! - [`ResolvedCoefficients`] - 全局系数与产品特殊系数逐字段合并后的生效值
//! - [`compute_price`] - 纯函数价格计算

pub mod calculator;
pub mod coefficients;

pub use calculator::{PriceInput, PriceKind, QualityIssue, compute_price, quality_issues};
pub use coefficients::{PriceCoefficients, ResolvedCoefficients};

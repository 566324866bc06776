//! 认证模块
//!
//! 当前用户解析：只校验 Bearer 令牌，不负责签发（签发属外部认证服务）。
//!
//! - [`JwtService`] - JWT 令牌校验服务
//! - [`CurrentUser`] - 当前用户上下文 (axum 提取器)

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};

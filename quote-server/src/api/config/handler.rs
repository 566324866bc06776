//! User Config API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::models::ConfigEntry;

use crate::auth::CurrentUser;
use crate::catalog::{self, WipeReport};
use crate::core::ServerState;
use crate::db::repository::config;
use crate::utils::{AppError, AppResult};

/// GET /api/config - 当前用户全部配置
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ConfigEntry>>> {
    let entries = config::get_all(&state.pool, &user.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(entries))
}

/// GET /api/config/:key - 读取单个配置项
pub async fn get_by_key(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(key): Path<String>,
) -> AppResult<Json<ConfigEntry>> {
    let entry = config::get(&state.pool, &user.id, &key)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Config {key}")))?;
    Ok(Json(entry))
}

/// PUT /api/config/:key - 写入/覆盖单个配置项（值为任意 JSON）
pub async fn set_by_key(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(key): Path<String>,
    Json(value): Json<serde_json::Value>,
) -> AppResult<Json<ConfigEntry>> {
    if key.trim().is_empty() {
        return Err(AppError::validation("config key must not be empty"));
    }
    let entry = config::set(&state.pool, &user.id, &key, &value)
        .await
        .map_err(AppError::from)?;
    Ok(Json(entry))
}

/// DELETE /api/config - 全量清空当前用户数据（配置、产品、历史）
pub async fn wipe(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<WipeReport>> {
    let report = catalog::wipe_user_data(&state.pool, &user.id).await?;
    Ok(Json(report))
}

//! Price History API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use shared::models::PriceHistory;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::price_history;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub skip: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub deleted: u64,
}

/// GET /api/history - 查询价格历史（最新在前）
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<PriceHistory>>> {
    let entries = price_history::find_by_user(
        &state.pool,
        &user.id,
        query.product_id.as_deref(),
        query.skip.unwrap_or(0),
        query.limit.unwrap_or(200),
    )
    .await
    .map_err(AppError::from)?;
    Ok(Json(entries))
}

/// DELETE /api/history/:id - 删除单条历史
pub async fn delete_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResult>> {
    let deleted = price_history::delete_by_id(&state.pool, &user.id, &id)
        .await
        .map_err(AppError::from)?;
    if !deleted {
        return Err(AppError::not_found(format!("History entry {id}")));
    }
    Ok(Json(DeleteResult { deleted: 1 }))
}

/// DELETE /api/history/by-product/:product_id - 删除某产品的全部历史
pub async fn delete_by_product(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<DeleteResult>> {
    let deleted = price_history::delete_by_product(&state.pool, &user.id, &product_id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(DeleteResult { deleted }))
}

/// DELETE /api/history - 清空当前用户的全部历史
pub async fn delete_all(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<DeleteResult>> {
    let deleted = price_history::delete_all(&state.pool, &user.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(DeleteResult { deleted }))
}

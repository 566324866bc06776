//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use shared::models::{Product, ProductInput, ProductQuery};

use crate::auth::CurrentUser;
use crate::catalog::{self, RecordedPrice, RepriceReport};
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePricesRequest {
    pub ids: Vec<String>,
    /// 新金价；不传则取用户配置，再缺省沿用各产品上次金价
    #[serde(default)]
    pub market_price: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub deleted: u64,
}

/// GET /api/products - 按条件查询在册产品（货号升序）
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(filters): Query<ProductQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let products = catalog::query(&state.pool, &user.id, &filters).await?;
    Ok(Json(products))
}

/// POST /api/products - 录价（按货号替换在册行并追加历史）
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductInput>,
) -> AppResult<Json<RecordedPrice>> {
    let recorded = catalog::record_price(&state.pool, &user.id, payload).await?;
    Ok(Json(recorded))
}

/// GET /api/products/:id - 获取单个产品
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = crate::db::repository::product::find_by_id(&state.pool, &user.id, &id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;
    Ok(Json(product))
}

/// DELETE /api/products/:id - 删除产品（级联删除其历史）
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResult>> {
    let deleted = catalog::delete_product(&state.pool, &user.id, &id).await?;
    if !deleted {
        return Err(AppError::not_found(format!("Product {id}")));
    }
    Ok(Json(DeleteResult { deleted: 1 }))
}

/// POST /api/products/batch-delete - 批量删除
pub async fn batch_delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<BatchDeleteRequest>,
) -> AppResult<Json<DeleteResult>> {
    if payload.ids.is_empty() {
        return Err(AppError::validation("ids must not be empty"));
    }
    let deleted = catalog::batch_delete(&state.pool, &user.id, &payload.ids).await?;
    Ok(Json(DeleteResult { deleted }))
}

/// POST /api/products/update-prices - 按当前系数批量改价
pub async fn update_prices(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<UpdatePricesRequest>,
) -> AppResult<Json<RepriceReport>> {
    if payload.ids.is_empty() {
        return Err(AppError::validation("ids must not be empty"));
    }
    let report =
        catalog::update_prices(&state.pool, &user.id, &payload.ids, payload.market_price).await?;
    Ok(Json(report))
}

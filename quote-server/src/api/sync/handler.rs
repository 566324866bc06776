//! Sync API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;

use shared::models::{DiagnosticReport, LocalSnapshot, ReconcileReport, SyncMode};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::sync::{SqliteStore, diagnose, executor};
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub mode: SyncMode,
    #[serde(default)]
    pub snapshot: LocalSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct DiagnoseRequest {
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub price_history: Vec<String>,
}

/// POST /api/sync/reconcile - 对账（verify 只读 / sync 推送）
pub async fn reconcile(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ReconcileRequest>,
) -> AppResult<Json<ReconcileReport>> {
    let store = SqliteStore::new(state.pool.clone());
    let report = executor::run(&store, &user.id, &payload.snapshot, payload.mode).await?;
    Ok(Json(report))
}

/// POST /api/sync/diagnose - 缺失 ID 诊断（只读）
pub async fn diagnose(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<DiagnoseRequest>,
) -> AppResult<Json<DiagnosticReport>> {
    let store = SqliteStore::new(state.pool.clone());
    let report = diagnose::diagnose_missing(
        &store,
        &user.id,
        &payload.products,
        &payload.price_history,
    )
    .await?;
    Ok(Json(report))
}

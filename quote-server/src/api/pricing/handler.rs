//! Pricing API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use shared::models::SpecialCoefficients;

use crate::auth::CurrentUser;
use crate::catalog;
use crate::core::ServerState;
use crate::pricing::{PriceInput, PriceKind, QualityIssue, compute_price, quality_issues};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ComputeRequest {
    #[serde(default)]
    pub category: String,
    pub weight: f64,
    pub labor_cost: f64,
    pub purity: String,
    /// 不传则取用户配置的金价
    #[serde(default)]
    pub market_price: Option<f64>,
    #[serde(default)]
    pub special: Option<SpecialCoefficients>,
}

#[derive(Debug, Serialize)]
pub struct ComputeResponse {
    pub market_price: f64,
    pub wholesale_price: f64,
    pub retail_price: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quality_issues: Vec<QualityIssue>,
}

/// POST /api/pricing/compute - 试算（只计算，不落库）
pub async fn compute(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ComputeRequest>,
) -> AppResult<Json<ComputeResponse>> {
    let coeffs = catalog::load_coefficients(&state.pool, &user.id).await?;
    let market_price = match payload.market_price {
        Some(price) => price,
        None => catalog::load_gold_price(&state.pool, &user.id)
            .await?
            .ok_or_else(|| {
                AppError::configuration(
                    "No market gold price configured (set goldPrice or pass market_price)",
                )
            })?,
    };

    let resolved = coeffs.resolve(payload.special.as_ref());
    let input = PriceInput {
        market_price,
        weight: payload.weight,
        labor_cost: payload.labor_cost,
        purity: &payload.purity,
    };

    let wholesale_price = compute_price(&input, PriceKind::Wholesale, &resolved)?;
    let retail_price = compute_price(&input, PriceKind::Retail, &resolved)?;
    let issues = quality_issues(&input, &payload.category, &resolved);

    Ok(Json(ComputeResponse {
        market_price,
        wholesale_price,
        retail_price,
        quality_issues: issues,
    }))
}

//! Price History Model

use serde::{Deserialize, Serialize};

use super::product::SpecialCoefficients;

/// One immutable snapshot of a pricing computation.
///
/// Append-only: rows are never updated, only inserted and (explicitly)
/// deleted. `product_id` is a soft reference — the product it points at
/// may have been replaced or removed since.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceHistory {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub product_code: String,
    pub category: String,
    pub weight: f64,
    pub labor_cost: f64,
    pub market_price: f64,
    pub purity: String,
    #[serde(default)]
    pub color: String,
    pub wholesale_price: f64,
    pub retail_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<SpecialCoefficients>,
    pub timestamp: i64,
}

/// Raw history record from a client-side cache, before normalization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistorySnapshot {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_code: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub labor_cost: Option<f64>,
    #[serde(default)]
    pub market_price: Option<f64>,
    #[serde(default)]
    pub purity: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub wholesale_price: Option<f64>,
    #[serde(default)]
    pub retail_price: Option<f64>,
    #[serde(default)]
    pub special: Option<SpecialCoefficients>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

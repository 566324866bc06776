//! Product Model

use serde::{Deserialize, Serialize};

/// Fixed catalog categories (accessory and silver lines included).
///
/// Stored and transported as plain text; membership is checked by the
/// data-quality pass rather than at deserialization, so records arriving
/// from older client caches with a foreign label still round-trip.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "耳环/耳逼",
    "戒指",
    "吊坠",
    "手链/手镯",
    "项链",
    "胸针",
    "配件",
    "银饰品",
];

/// A single per-product coefficient override with its own update time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecialValue {
    pub value: f64,
    pub updated_at: i64,
}

impl SpecialValue {
    pub fn new(value: f64, updated_at: i64) -> Self {
        Self { value, updated_at }
    }
}

/// Per-product coefficient overrides.
///
/// Every field is independent: a present field supersedes the matching
/// global coefficient for that product only, absent fields fall back to
/// the global set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialCoefficients {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_loss: Option<SpecialValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_cost: Option<SpecialValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_margin: Option<SpecialValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_factor_wholesale: Option<SpecialValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_factor_retail: Option<SpecialValue>,
}

impl SpecialCoefficients {
    pub fn is_empty(&self) -> bool {
        self.material_loss.is_none()
            && self.material_cost.is_none()
            && self.profit_margin.is_none()
            && self.labor_factor_wholesale.is_none()
            && self.labor_factor_retail.is_none()
    }
}

/// Product entity — the current authoritative state of one sellable
/// item variant. One live row per (user, category, product_code).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub user_id: String,
    pub category: String,
    #[serde(default)]
    pub sub_category: String,
    pub product_code: String,
    #[serde(default)]
    pub specification: String,
    /// Grams
    pub weight: f64,
    pub labor_cost: f64,
    /// Purity tier, e.g. "14K" / "18K" / "925"
    pub purity: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub accessory_cost: f64,
    #[serde(default)]
    pub stone_cost: f64,
    #[serde(default)]
    pub plating_cost: f64,
    #[serde(default)]
    pub mold_cost: f64,
    #[serde(default)]
    pub commission: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<SpecialCoefficients>,
    /// Market gold price at the time of the last computation
    pub market_price: f64,
    pub wholesale_price: f64,
    pub retail_price: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Price entry payload — creates a product or replaces the live row for
/// its product code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInput {
    pub category: String,
    #[serde(default)]
    pub sub_category: String,
    pub product_code: String,
    #[serde(default)]
    pub specification: String,
    pub weight: f64,
    pub labor_cost: f64,
    pub purity: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub accessory_cost: f64,
    #[serde(default)]
    pub stone_cost: f64,
    #[serde(default)]
    pub plating_cost: f64,
    #[serde(default)]
    pub mold_cost: f64,
    #[serde(default)]
    pub commission: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<SpecialCoefficients>,
    /// Overrides the stored gold price when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_price: Option<f64>,
}

/// Product list filters + pagination
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    /// Case-sensitive substring match on product_code
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub purity: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub skip: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Raw product record from a client-side cache, before normalization.
///
/// Everything is optional: the sync path defaults missing fields rather
/// than rejecting the whole snapshot (missing id/product_code is the one
/// per-record hard failure).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductSnapshot {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub product_code: Option<String>,
    #[serde(default)]
    pub specification: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub labor_cost: Option<f64>,
    #[serde(default)]
    pub purity: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub accessory_cost: Option<f64>,
    #[serde(default)]
    pub stone_cost: Option<f64>,
    #[serde(default)]
    pub plating_cost: Option<f64>,
    #[serde(default)]
    pub mold_cost: Option<f64>,
    #[serde(default)]
    pub commission: Option<f64>,
    #[serde(default)]
    pub special: Option<SpecialCoefficients>,
    #[serde(default)]
    pub market_price: Option<f64>,
    #[serde(default)]
    pub wholesale_price: Option<f64>,
    #[serde(default)]
    pub retail_price: Option<f64>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_coefficients_partial_json() {
        let json = r#"{"material_loss":{"value":1.2,"updated_at":1700000000000}}"#;
        let special: SpecialCoefficients = serde_json::from_str(json).unwrap();
        assert_eq!(special.material_loss.unwrap().value, 1.2);
        assert!(special.profit_margin.is_none());
        assert!(!special.is_empty());
    }

    #[test]
    fn test_product_snapshot_tolerates_sparse_json() {
        let snapshot: ProductSnapshot =
            serde_json::from_str(r#"{"id":"p1","product_code":"E-001"}"#).unwrap();
        assert_eq!(snapshot.id.as_deref(), Some("p1"));
        assert!(snapshot.weight.is_none());
        assert!(snapshot.special.is_none());
    }
}

//! Price Calculator
//!
//! Pure pricing formula. Uses rust_decimal for precise calculations,
//! stores as f64.
//!
//! The calculator is total over its numeric inputs: zero weight or a
//! negative labor cost still computes (the data-quality pass flags them);
//! only a zero exchange rate or an unknown purity tier aborts, as
//! configuration errors.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::pricing::ResolvedCoefficients;
use crate::utils::AppError;

/// Rounding for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Which of the two prices to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceKind {
    Wholesale,
    Retail,
}

/// Inputs to one price computation
#[derive(Debug, Clone)]
pub struct PriceInput<'a> {
    /// 金价 (per gram, market currency)
    pub market_price: f64,
    /// 克重
    pub weight: f64,
    /// 工费
    pub labor_cost: f64,
    /// 成色档位 ("14K" / "18K" / "925" ...)
    pub purity: &'a str,
}

/// Compute one price:
///
/// ```text
/// material = market_price * gold_factor(purity) * weight * material_loss * material_cost / exchange_rate
/// labor    = labor_cost * labor_factor / exchange_rate
/// price    = round2((material + labor) * profit_margin)
/// ```
pub fn compute_price(
    input: &PriceInput<'_>,
    kind: PriceKind,
    coeffs: &ResolvedCoefficients<'_>,
) -> Result<f64, AppError> {
    let gold_factor = coeffs.gold_factor(input.purity).ok_or_else(|| {
        AppError::configuration(format!("No gold factor configured for purity {}", input.purity))
    })?;

    if coeffs.exchange_rate == 0.0 {
        return Err(AppError::configuration("Exchange rate must not be zero"));
    }

    let labor_factor = match kind {
        PriceKind::Wholesale => coeffs.labor_factor_wholesale,
        PriceKind::Retail => coeffs.labor_factor_retail,
    };

    let rate = to_decimal(coeffs.exchange_rate);
    let material = to_decimal(input.market_price)
        * to_decimal(gold_factor)
        * to_decimal(input.weight)
        * to_decimal(coeffs.material_loss)
        * to_decimal(coeffs.material_cost)
        / rate;
    let labor = to_decimal(input.labor_cost) * to_decimal(labor_factor) / rate;
    let total = (material + labor) * to_decimal(coeffs.profit_margin);

    Ok(to_f64(total))
}

// =============================================================================
// Data quality pass
// =============================================================================

/// Suspicious-but-accepted input conditions, surfaced alongside results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityIssue {
    NonPositiveWeight,
    NegativeLaborCost,
    NonPositiveMarketPrice,
    UnknownCategory,
    UnknownPurity,
}

/// Flag data-quality issues on a pricing input. Never rejects — the
/// calculator accepts these values; callers surface the flags to the user.
pub fn quality_issues(
    input: &PriceInput<'_>,
    category: &str,
    coeffs: &ResolvedCoefficients<'_>,
) -> Vec<QualityIssue> {
    let mut issues = Vec::new();
    if input.weight <= 0.0 {
        issues.push(QualityIssue::NonPositiveWeight);
    }
    if input.labor_cost < 0.0 {
        issues.push(QualityIssue::NegativeLaborCost);
    }
    if input.market_price <= 0.0 {
        issues.push(QualityIssue::NonPositiveMarketPrice);
    }
    if !shared::models::KNOWN_CATEGORIES.contains(&category) {
        issues.push(QualityIssue::UnknownCategory);
    }
    if !coeffs.knows_purity(input.purity) {
        issues.push(QualityIssue::UnknownPurity);
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PriceCoefficients;
    use shared::models::{SpecialCoefficients, SpecialValue};

    fn example_coeffs() -> PriceCoefficients {
        // 与文档示例一致的系数集
        PriceCoefficients {
            labor_factor_wholesale: 3.0,
            labor_factor_retail: 4.0,
            material_loss: 1.15,
            material_cost: 1.1,
            profit_margin: 1.25,
            exchange_rate: 5.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_wholesale_example() {
        // material = 500 * 0.755 * 2 * 1.15 * 1.1 / 5 = 191.015
        // labor    = 100 * 3 / 5 = 60
        // total    = (191.015 + 60) * 1.25 = 313.76875 → 313.77
        let coeffs = example_coeffs();
        let resolved = coeffs.resolve(None);
        let input = PriceInput {
            market_price: 500.0,
            weight: 2.0,
            labor_cost: 100.0,
            purity: "18K",
        };
        let price = compute_price(&input, PriceKind::Wholesale, &resolved).unwrap();
        assert_eq!(price, 313.77);
    }

    #[test]
    fn test_retail_uses_retail_labor_factor() {
        let coeffs = example_coeffs();
        let resolved = coeffs.resolve(None);
        let input = PriceInput {
            market_price: 500.0,
            weight: 2.0,
            labor_cost: 100.0,
            purity: "18K",
        };
        // labor = 100 * 4 / 5 = 80 → (191.015 + 80) * 1.25 = 338.76875 → 338.77
        let price = compute_price(&input, PriceKind::Retail, &resolved).unwrap();
        assert_eq!(price, 338.77);
    }

    #[test]
    fn test_determinism() {
        let coeffs = example_coeffs();
        let resolved = coeffs.resolve(None);
        let input = PriceInput {
            market_price: 487.35,
            weight: 3.21,
            labor_cost: 75.5,
            purity: "14K",
        };
        let first = compute_price(&input, PriceKind::Wholesale, &resolved).unwrap();
        for _ in 0..10 {
            assert_eq!(
                compute_price(&input, PriceKind::Wholesale, &resolved).unwrap(),
                first
            );
        }
    }

    #[test]
    fn test_special_override_changes_result() {
        let coeffs = example_coeffs();
        let special = SpecialCoefficients {
            profit_margin: Some(SpecialValue::new(1.0, 0)),
            ..Default::default()
        };
        let resolved = coeffs.resolve(Some(&special));
        let input = PriceInput {
            market_price: 500.0,
            weight: 2.0,
            labor_cost: 100.0,
            purity: "18K",
        };
        // margin 1.0 → 191.015 + 60 = 251.015 → 251.02 (half away from zero)
        let price = compute_price(&input, PriceKind::Wholesale, &resolved).unwrap();
        assert_eq!(price, 251.02);
    }

    #[test]
    fn test_zero_exchange_rate_is_configuration_error() {
        let coeffs = PriceCoefficients {
            exchange_rate: 0.0,
            ..example_coeffs()
        };
        let resolved = coeffs.resolve(None);
        let input = PriceInput {
            market_price: 500.0,
            weight: 2.0,
            labor_cost: 100.0,
            purity: "18K",
        };
        let err = compute_price(&input, PriceKind::Wholesale, &resolved).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_unknown_purity_is_configuration_error() {
        let coeffs = example_coeffs();
        let resolved = coeffs.resolve(None);
        let input = PriceInput {
            market_price: 500.0,
            weight: 2.0,
            labor_cost: 100.0,
            purity: "22K",
        };
        let err = compute_price(&input, PriceKind::Wholesale, &resolved).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_degenerate_inputs_still_compute() {
        // 计算器对退化输入不报错，由质量检查标记
        let coeffs = example_coeffs();
        let resolved = coeffs.resolve(None);
        let input = PriceInput {
            market_price: 0.0,
            weight: -1.0,
            labor_cost: -10.0,
            purity: "18K",
        };
        let price = compute_price(&input, PriceKind::Wholesale, &resolved).unwrap();
        // material 0 * ... = 0, labor = -10*3/5 = -6 → -6*1.25 = -7.5
        assert_eq!(price, -7.5);

        let issues = quality_issues(&input, "戒指", &resolved);
        assert!(issues.contains(&QualityIssue::NonPositiveWeight));
        assert!(issues.contains(&QualityIssue::NegativeLaborCost));
        assert!(issues.contains(&QualityIssue::NonPositiveMarketPrice));
        assert!(!issues.contains(&QualityIssue::UnknownCategory));
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        // 构造恰好落在 0.005 上的结果: total = 0.005 → 0.01
        let coeffs = PriceCoefficients {
            labor_factor_wholesale: 1.0,
            material_loss: 1.0,
            material_cost: 1.0,
            profit_margin: 1.0,
            exchange_rate: 1.0,
            ..Default::default()
        };
        let resolved = coeffs.resolve(None);
        let input = PriceInput {
            market_price: 0.0,
            weight: 0.0,
            labor_cost: 0.005,
            purity: "18K",
        };
        let price = compute_price(&input, PriceKind::Wholesale, &resolved).unwrap();
        assert_eq!(price, 0.01);
    }

    #[test]
    fn test_quality_flags_unknown_category_and_purity() {
        let coeffs = example_coeffs();
        let resolved = coeffs.resolve(None);
        let input = PriceInput {
            market_price: 500.0,
            weight: 1.0,
            labor_cost: 10.0,
            purity: "999",
        };
        let issues = quality_issues(&input, "玉器", &resolved);
        assert!(issues.contains(&QualityIssue::UnknownCategory));
        assert!(issues.contains(&QualityIssue::UnknownPurity));
    }
}

//! Coefficient Sets
//!
//! The global set lives in user config under the `priceCoefficients` key
//! and is loaded per request — there is no process-wide coefficient state.
//! A product may carry partial per-field overrides ("special" coefficients)
//! that supersede the global value for that product only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use shared::models::SpecialCoefficients;

/// Global pricing coefficient set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceCoefficients {
    /// 每个成色档位的含金/含银量系数 (如 "18K" → 0.755, "925" → 0.925)
    pub gold_factors: HashMap<String, f64>,
    pub labor_factor_wholesale: f64,
    pub labor_factor_retail: f64,
    /// 损耗系数
    pub material_loss: f64,
    /// 料费系数
    pub material_cost: f64,
    /// 利润系数
    pub profit_margin: f64,
    /// 汇率；为 0 视为配置错误，计算立即失败
    pub exchange_rate: f64,
}

impl Default for PriceCoefficients {
    fn default() -> Self {
        let gold_factors = HashMap::from([
            ("14K".to_string(), 0.586),
            ("18K".to_string(), 0.755),
            ("24K".to_string(), 0.999),
            ("925".to_string(), 0.925),
        ]);
        Self {
            gold_factors,
            labor_factor_wholesale: 3.0,
            labor_factor_retail: 4.0,
            material_loss: 1.15,
            material_cost: 1.1,
            profit_margin: 1.25,
            exchange_rate: 5.0,
        }
    }
}

impl PriceCoefficients {
    /// 合并产品特殊系数：有值的字段覆盖全局，缺省字段回退全局
    pub fn resolve(&self, special: Option<&SpecialCoefficients>) -> ResolvedCoefficients<'_> {
        let pick = |global: f64, field: Option<shared::models::SpecialValue>| {
            field.map(|s| s.value).unwrap_or(global)
        };
        match special {
            Some(s) => ResolvedCoefficients {
                gold_factors: &self.gold_factors,
                labor_factor_wholesale: pick(self.labor_factor_wholesale, s.labor_factor_wholesale),
                labor_factor_retail: pick(self.labor_factor_retail, s.labor_factor_retail),
                material_loss: pick(self.material_loss, s.material_loss),
                material_cost: pick(self.material_cost, s.material_cost),
                profit_margin: pick(self.profit_margin, s.profit_margin),
                exchange_rate: self.exchange_rate,
            },
            None => ResolvedCoefficients {
                gold_factors: &self.gold_factors,
                labor_factor_wholesale: self.labor_factor_wholesale,
                labor_factor_retail: self.labor_factor_retail,
                material_loss: self.material_loss,
                material_cost: self.material_cost,
                profit_margin: self.profit_margin,
                exchange_rate: self.exchange_rate,
            },
        }
    }
}

/// The coefficient values in effect for one computation
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCoefficients<'a> {
    gold_factors: &'a HashMap<String, f64>,
    pub labor_factor_wholesale: f64,
    pub labor_factor_retail: f64,
    pub material_loss: f64,
    pub material_cost: f64,
    pub profit_margin: f64,
    pub exchange_rate: f64,
}

impl ResolvedCoefficients<'_> {
    /// 成色档位系数；未配置的档位返回 None（上层作为配置错误处理）
    pub fn gold_factor(&self, purity: &str) -> Option<f64> {
        self.gold_factors.get(purity).copied()
    }

    pub fn knows_purity(&self, purity: &str) -> bool {
        self.gold_factors.contains_key(purity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::SpecialValue;

    #[test]
    fn test_resolve_without_special() {
        let coeffs = PriceCoefficients::default();
        let resolved = coeffs.resolve(None);
        assert_eq!(resolved.material_loss, 1.15);
        assert_eq!(resolved.gold_factor("18K"), Some(0.755));
        assert_eq!(resolved.gold_factor("22K"), None);
    }

    #[test]
    fn test_resolve_partial_override() {
        let coeffs = PriceCoefficients::default();
        let special = SpecialCoefficients {
            profit_margin: Some(SpecialValue::new(1.5, 1700000000000)),
            labor_factor_retail: Some(SpecialValue::new(5.0, 1700000000000)),
            ..Default::default()
        };
        let resolved = coeffs.resolve(Some(&special));

        // overridden field-by-field
        assert_eq!(resolved.profit_margin, 1.5);
        assert_eq!(resolved.labor_factor_retail, 5.0);
        // unset fields fall back to the globals
        assert_eq!(resolved.material_loss, 1.15);
        assert_eq!(resolved.labor_factor_wholesale, 3.0);
    }

    #[test]
    fn test_coefficients_deserialize_partial_json() {
        // 客户端只存了部分字段时，其余取默认值
        let coeffs: PriceCoefficients =
            serde_json::from_str(r#"{"profit_margin":1.3,"exchange_rate":5.2}"#).unwrap();
        assert_eq!(coeffs.profit_margin, 1.3);
        assert_eq!(coeffs.exchange_rate, 5.2);
        assert_eq!(coeffs.material_loss, 1.15);
    }
}

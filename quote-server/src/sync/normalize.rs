//! 写前规整
//!
//! 客户端缓存导出的记录形状松散（字段可缺、可为 null）。任何写入前都
//! 必须走这一步：数值缺省补 0，字符串补空串，时间戳补当前时间，保证
//! 远端表约束总能满足。缺 ID 或货号的记录整条拒绝并计入失败，绝不
//! 静默丢弃；超长 ID 同样拒绝（存储端身份列宽度是硬前置条件，不做
//! 静默截断）。

use shared::models::{HistorySnapshot, PriceHistory, Product, ProductSnapshot, RecordFailure};
use shared::util::MAX_ID_LEN;

fn check_id(id: &Option<String>, fallback_label: &str) -> Result<String, RecordFailure> {
    let id = match id {
        Some(id) if !id.trim().is_empty() => id.clone(),
        _ => {
            return Err(RecordFailure {
                id: fallback_label.to_string(),
                message: "Record is missing its id".to_string(),
            });
        }
    };
    if id.len() > MAX_ID_LEN {
        return Err(RecordFailure {
            id,
            message: format!("Id exceeds the {MAX_ID_LEN}-character identity width"),
        });
    }
    Ok(id)
}

/// 产品记录规整。`now` 由调用方统一传入，保证一个批次内缺省时间一致。
pub fn normalize_product(
    user_id: &str,
    raw: &ProductSnapshot,
    now: i64,
) -> Result<Product, RecordFailure> {
    let fallback = raw
        .product_code
        .clone()
        .unwrap_or_else(|| "<missing-id>".to_string());
    let id = check_id(&raw.id, &fallback)?;

    let product_code = match &raw.product_code {
        Some(code) if !code.trim().is_empty() => code.clone(),
        _ => {
            return Err(RecordFailure {
                id,
                message: "Record is missing its product_code".to_string(),
            });
        }
    };

    Ok(Product {
        id,
        user_id: user_id.to_string(),
        category: raw.category.clone().unwrap_or_default(),
        sub_category: raw.sub_category.clone().unwrap_or_default(),
        product_code,
        specification: raw.specification.clone().unwrap_or_default(),
        weight: raw.weight.unwrap_or(0.0),
        labor_cost: raw.labor_cost.unwrap_or(0.0),
        purity: raw.purity.clone().unwrap_or_default(),
        color: raw.color.clone().unwrap_or_default(),
        accessory_cost: raw.accessory_cost.unwrap_or(0.0),
        stone_cost: raw.stone_cost.unwrap_or(0.0),
        plating_cost: raw.plating_cost.unwrap_or(0.0),
        mold_cost: raw.mold_cost.unwrap_or(0.0),
        commission: raw.commission.unwrap_or(0.0),
        special: raw.special.clone().filter(|s| !s.is_empty()),
        market_price: raw.market_price.unwrap_or(0.0),
        wholesale_price: raw.wholesale_price.unwrap_or(0.0),
        retail_price: raw.retail_price.unwrap_or(0.0),
        created_at: raw.created_at.unwrap_or(now),
        updated_at: raw.updated_at.unwrap_or(now),
    })
}

/// 历史记录规整。历史只要求自身 ID；product_id 是软引用，可缺省为空。
pub fn normalize_history(
    user_id: &str,
    raw: &HistorySnapshot,
    now: i64,
) -> Result<PriceHistory, RecordFailure> {
    let fallback = raw
        .product_code
        .clone()
        .unwrap_or_else(|| "<missing-id>".to_string());
    let id = check_id(&raw.id, &fallback)?;

    Ok(PriceHistory {
        id,
        user_id: user_id.to_string(),
        product_id: raw.product_id.clone().unwrap_or_default(),
        product_code: raw.product_code.clone().unwrap_or_default(),
        category: raw.category.clone().unwrap_or_default(),
        weight: raw.weight.unwrap_or(0.0),
        labor_cost: raw.labor_cost.unwrap_or(0.0),
        market_price: raw.market_price.unwrap_or(0.0),
        purity: raw.purity.clone().unwrap_or_default(),
        color: raw.color.clone().unwrap_or_default(),
        wholesale_price: raw.wholesale_price.unwrap_or(0.0),
        retail_price: raw.retail_price.unwrap_or(0.0),
        special: raw.special.clone().filter(|s| !s.is_empty()),
        timestamp: raw.timestamp.unwrap_or(now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_750_000_000_000;

    fn minimal_snapshot() -> ProductSnapshot {
        ProductSnapshot {
            id: Some("p1".to_string()),
            product_code: Some("E-001".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_numeric_and_string_defaults() {
        let product = normalize_product("u1", &minimal_snapshot(), NOW).unwrap();
        assert_eq!(product.user_id, "u1");
        assert_eq!(product.stone_cost, 0.0);
        assert_eq!(product.weight, 0.0);
        assert_eq!(product.category, "");
        assert_eq!(product.created_at, NOW);
        assert_eq!(product.updated_at, NOW);
        assert!(product.special.is_none());
    }

    #[test]
    fn test_present_fields_survive() {
        let raw = ProductSnapshot {
            weight: Some(2.5),
            stone_cost: Some(30.0),
            created_at: Some(1_600_000_000_000),
            ..minimal_snapshot()
        };
        let product = normalize_product("u1", &raw, NOW).unwrap();
        assert_eq!(product.weight, 2.5);
        assert_eq!(product.stone_cost, 30.0);
        assert_eq!(product.created_at, 1_600_000_000_000);
    }

    #[test]
    fn test_missing_id_rejected() {
        let raw = ProductSnapshot {
            id: None,
            ..minimal_snapshot()
        };
        let err = normalize_product("u1", &raw, NOW).unwrap_err();
        assert_eq!(err.id, "E-001");
        assert!(err.message.contains("missing its id"));
    }

    #[test]
    fn test_blank_id_rejected() {
        let raw = ProductSnapshot {
            id: Some("   ".to_string()),
            ..minimal_snapshot()
        };
        assert!(normalize_product("u1", &raw, NOW).is_err());
    }

    #[test]
    fn test_missing_product_code_rejected() {
        let raw = ProductSnapshot {
            product_code: None,
            ..minimal_snapshot()
        };
        let err = normalize_product("u1", &raw, NOW).unwrap_err();
        assert_eq!(err.id, "p1");
        assert!(err.message.contains("product_code"));
    }

    #[test]
    fn test_oversized_id_rejected() {
        let raw = ProductSnapshot {
            id: Some("x".repeat(MAX_ID_LEN + 1)),
            ..minimal_snapshot()
        };
        let err = normalize_product("u1", &raw, NOW).unwrap_err();
        assert!(err.message.contains("identity width"));
    }

    #[test]
    fn test_history_defaults_and_soft_reference() {
        let raw = HistorySnapshot {
            id: Some("h1".to_string()),
            ..Default::default()
        };
        let entry = normalize_history("u1", &raw, NOW).unwrap();
        assert_eq!(entry.product_id, "");
        assert_eq!(entry.timestamp, NOW);
        assert_eq!(entry.wholesale_price, 0.0);
    }

    #[test]
    fn test_history_missing_id_rejected() {
        let raw = HistorySnapshot {
            product_code: Some("E-001".to_string()),
            ..Default::default()
        };
        let err = normalize_history("u1", &raw, NOW).unwrap_err();
        assert_eq!(err.id, "E-001");
    }
}

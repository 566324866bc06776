//! User Config Model
//!
//! Named, user-scoped configuration values stored as opaque JSON under a
//! string key. At most one value per (user, key); writes are upserts.

use serde::{Deserialize, Serialize};

/// Well-known config keys. The server interprets `GOLD_PRICE` and
/// `PRICE_COEFFICIENTS`; the rest are stored and returned verbatim.
pub mod keys {
    /// Current market gold price (number)
    pub const GOLD_PRICE: &str = "goldPrice";
    /// Global pricing coefficient set (object)
    pub const PRICE_COEFFICIENTS: &str = "priceCoefficients";
    /// Silver pricing configuration (opaque)
    pub const SILVER_PRICE_CONFIG: &str = "silver_price_config";
    /// Client cache schema version (opaque)
    pub const DATA_VERSION: &str = "dataVersion";
}

/// One (user, key) config value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub user_id: String,
    pub config_key: String,
    pub value: serde_json::Value,
    pub updated_at: i64,
}

//! Domain models
//!
//! Pure serde types. Database row mapping lives in quote-server's
//! repository layer so parsing happens exactly once at that boundary.

pub mod config_entry;
pub mod price_history;
pub mod product;
pub mod sync;

pub use config_entry::{ConfigEntry, keys};
pub use price_history::{HistorySnapshot, PriceHistory};
pub use product::{
    KNOWN_CATEGORIES, Product, ProductInput, ProductQuery, ProductSnapshot, SpecialCoefficients,
    SpecialValue,
};
pub use sync::{
    DiagnosticReport, EntityReport, IdentityAnomaly, LocalSnapshot, MissingIdFinding,
    MissingIdReport, ReconcileReport, RecordFailure, SyncCounts, SyncMode, SyncOutcome,
    SyncVerdict,
};

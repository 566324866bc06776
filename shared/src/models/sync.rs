//! Sync protocol and report types
//!
//! Exchanged between a client-side cache and quote-server's
//! reconciliation endpoints, and returned to callers as the structured
//! result of verify/sync/diagnose runs.

use serde::{Deserialize, Serialize};

use super::price_history::HistorySnapshot;
use super::product::ProductSnapshot;

/// Reconciliation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Read-only: report discrepancies, write nothing
    Verify,
    /// Push local-only records to the store
    Sync,
}

/// Per-entity classification of local vs remote record sets.
///
/// Evaluated in order: both sides empty, local has records the store
/// lacks, store is a strict superset, otherwise the sets match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncVerdict {
    FullyMatched,
    LocalAhead,
    RemoteAhead,
    BothEmpty,
}

/// Outcome of processing a single record during sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    Created,
    Updated,
    Skipped,
    Failed,
}

/// Aggregate counters for one entity's sync batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCounts {
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
    pub failed: u32,
}

impl SyncCounts {
    pub fn record(&mut self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Created => self.created += 1,
            SyncOutcome::Updated => self.updated += 1,
            SyncOutcome::Skipped => self.skipped += 1,
            SyncOutcome::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.created + self.updated + self.skipped + self.failed
    }
}

/// Per-record failure detail (validation or write error)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFailure {
    /// Record id, or the product code when the id itself was missing
    pub id: String,
    pub message: String,
}

/// Same-id-different-content collision found on an append-only entity.
/// Reported, never auto-resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityAnomaly {
    pub id: String,
    pub detail: String,
}

/// Reconciliation result for one entity type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityReport {
    pub verdict: SyncVerdict,
    pub local_count: usize,
    pub remote_count: usize,
    /// Ids the client has that the store does not
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_remote: Vec<String>,
    /// Ids the store has that the client does not (informational)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_local: Vec<String>,
    pub counts: SyncCounts,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<RecordFailure>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<IdentityAnomaly>,
}

/// Full reconciliation report returned by verify/sync runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub mode: SyncMode,
    pub products: EntityReport,
    pub price_history: EntityReport,
    /// Unix millis
    pub ran_at: i64,
}

impl ReconcileReport {
    /// True when nothing failed anywhere in the run
    pub fn is_clean(&self) -> bool {
        self.products.counts.failed == 0
            && self.price_history.counts.failed == 0
            && self.products.anomalies.is_empty()
            && self.price_history.anomalies.is_empty()
    }
}

/// The client cache contents submitted for reconciliation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalSnapshot {
    #[serde(default)]
    pub products: Vec<ProductSnapshot>,
    #[serde(default)]
    pub price_history: Vec<HistorySnapshot>,
}

// =============================================================================
// Missing-id diagnostics
// =============================================================================

/// Heuristic explanation for one candidate id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "finding", rename_all = "kebab-case")]
pub enum MissingIdFinding {
    /// The id exists remotely after all
    Present,
    /// A remote row exists under the truncated prefix of this id —
    /// the remote identity column was narrower than the id format
    LikelyTruncated { remote_id: String },
    /// No trace of the id remotely
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingIdReport {
    pub id: String,
    #[serde(flatten)]
    pub finding: MissingIdFinding,
}

/// Read-only "analyze missing" result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<MissingIdReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub price_history: Vec<MissingIdReport>,
    pub ran_at: i64,
}

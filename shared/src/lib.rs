//! Shared types for the quoting stack
//!
//! Domain models, sync protocol/report types and small utilities used by
//! both the server and in-process clients.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

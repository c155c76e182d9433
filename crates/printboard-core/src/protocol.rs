//! HTTP wire format shared by the gateway and client sessions
//!
//! ```text
//! POST /fingerprints   <Fingerprint>        -> { success, count, storageType }
//! GET  /fingerprints                        -> { fingerprints: [Fingerprint], storageType }
//! GET  /debug                               -> { count, storageType, fingerprints: [DebugEntry] }
//! any failure                               -> 500 { error, details }
//! ```

use crate::types::{iso_timestamp, BackendKind, Fingerprint};
use serde::{Deserialize, Serialize};

pub const FINGERPRINTS_PATH: &str = "/fingerprints";
pub const DEBUG_PATH: &str = "/debug";

/// Retention window for the client-facing list (2 minutes).
pub const LIST_MAX_AGE_MS: i64 = 120_000;
/// Longer retention window used by the debug view (5 minutes).
pub const DEBUG_MAX_AGE_MS: i64 = 300_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub count: usize,
    pub storage_type: BackendKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    #[serde(default)]
    pub fingerprints: Vec<Fingerprint>,
    pub storage_type: BackendKind,
}

/// Abbreviated registry entry for the debug view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugEntry {
    pub id: String,
    pub moniker: String,
    pub timestamp: String,
    pub browser: String,
    pub os: String,
}

impl From<&Fingerprint> for DebugEntry {
    fn from(fp: &Fingerprint) -> Self {
        Self {
            id: fp.short_id(),
            moniker: fp.moniker.clone(),
            timestamp: iso_timestamp(fp.timestamp),
            browser: fp.details.browser.clone(),
            os: fp.details.os.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugResponse {
    pub count: usize,
    pub storage_type: BackendKind,
    pub fingerprints: Vec<DebugEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub details: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

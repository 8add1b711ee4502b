use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One provider's successfully fetched payload, tagged with its brand label.
///
/// Serialized as `{"brand": ..., "data": ...}`, which is the per-brand entry
/// shape of the aggregated snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFetchResult {
    #[serde(rename = "brand")]
    pub brand_label: String,
    #[serde(rename = "data")]
    pub payload: serde_json::Value,
}

/// The aggregated artifact of one collection cycle.
///
/// Carries raw payloads; station records are derived from it downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub last_updated: DateTime<Utc>,
    pub data: Vec<RawFetchResult>,
}

impl Snapshot {
    #[must_use]
    pub fn new(last_updated: DateTime<Utc>, data: Vec<RawFetchResult>) -> Self {
        Self { last_updated, data }
    }

    #[must_use]
    pub fn brands(&self) -> Vec<&str> {
        self.data.iter().map(|r| r.brand_label.as_str()).collect()
    }
}

//! Normalization of raw provider payloads into [`StationRecord`]s.
//!
//! Each payload is handled independently: an unrecognized shape yields zero
//! records for that brand and nothing else is affected. Entries whose fields
//! cannot be resolved are dropped and counted rather than reported.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use fuelwatch_core::{Prices, RawFetchResult, Snapshot, StationRecord, EXTRA_GRADES};
use serde_json::Value;

use crate::fields::{try_fields, try_string, try_timestamp};

const LATITUDE: &[&str] = &["latitude", "lat", "Latitude", "location.latitude"];
const LONGITUDE: &[&str] = &["longitude", "lng", "Longitude", "location.longitude"];

const UNLEADED: &[&str] = &["unleaded", "prices.unleaded", "UnleadedPrice"];
const DIESEL: &[&str] = &["diesel", "prices.diesel", "DieselPrice"];
const PREMIUM: &[&str] = &["premium", "prices.premium", "PremiumPrice"];

const TIMESTAMP: &[&str] = &["last_updated", "lastUpdated"];
const ADDRESS: &[&str] = &["address", "Address"];
const POSTCODE: &[&str] = &["postcode", "Postcode"];
const SITE_ID: &[&str] = &["site_id", "siteId"];

/// Where a payload keeps its station list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationShape {
    BareArray,
    StationsKey,
    DataKey,
}

/// Counts for one payload, or summed over a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    pub payloads: usize,
    pub unrecognized_payloads: usize,
    pub candidates: usize,
    pub emitted: usize,
    pub dropped: usize,
}

impl NormalizeSummary {
    fn absorb(&mut self, other: NormalizeSummary) {
        self.payloads += other.payloads;
        self.unrecognized_payloads += other.unrecognized_payloads;
        self.candidates += other.candidates;
        self.emitted += other.emitted;
        self.dropped += other.dropped;
    }
}

/// Find the station list: a bare array, then `stations`, then `data`. The
/// first shape whose field is present and is an array wins.
#[must_use]
pub fn locate_stations(payload: &Value) -> Option<(StationShape, &Vec<Value>)> {
    if let Some(entries) = payload.as_array() {
        return Some((StationShape::BareArray, entries));
    }
    if let Some(entries) = payload.get("stations").and_then(Value::as_array) {
        return Some((StationShape::StationsKey, entries));
    }
    payload
        .get("data")
        .and_then(Value::as_array)
        .map(|entries| (StationShape::DataKey, entries))
}

/// Normalize one provider payload.
///
/// `collected_at` is the last-resort timestamp for entries and payloads that
/// carry none of their own.
#[must_use]
pub fn normalize_payload(
    raw: &RawFetchResult,
    collected_at: DateTime<Utc>,
) -> (Vec<StationRecord>, NormalizeSummary) {
    let mut summary = NormalizeSummary {
        payloads: 1,
        ..NormalizeSummary::default()
    };

    let Some((shape, entries)) = locate_stations(&raw.payload) else {
        tracing::warn!(
            brand = %raw.brand_label,
            "payload has no recognizable station list; skipping"
        );
        summary.unrecognized_payloads = 1;
        return (Vec::new(), summary);
    };

    let payload_updated = try_timestamp(&raw.payload, TIMESTAMP).unwrap_or(collected_at);

    summary.candidates = entries.len();
    let records: Vec<StationRecord> = entries
        .iter()
        .filter_map(|entry| normalize_station(entry, &raw.brand_label, payload_updated))
        .collect();
    summary.emitted = records.len();
    summary.dropped = summary.candidates - summary.emitted;

    tracing::debug!(
        brand = %raw.brand_label,
        ?shape,
        candidates = summary.candidates,
        emitted = summary.emitted,
        "normalized payload"
    );

    (records, summary)
}

/// Normalize every payload of a cycle, logging one summary line.
#[must_use]
pub fn normalize_all(
    results: &[RawFetchResult],
    collected_at: DateTime<Utc>,
) -> (Vec<StationRecord>, NormalizeSummary) {
    let mut summary = NormalizeSummary::default();
    let mut records = Vec::new();

    for raw in results {
        let (stations, payload_summary) = normalize_payload(raw, collected_at);
        records.extend(stations);
        summary.absorb(payload_summary);
    }

    tracing::info!(
        payloads = summary.payloads,
        unrecognized = summary.unrecognized_payloads,
        candidates = summary.candidates,
        emitted = summary.emitted,
        dropped = summary.dropped,
        "normalization complete"
    );

    (records, summary)
}

/// Normalize a persisted snapshot, using its `lastUpdated` as the
/// collection time.
#[must_use]
pub fn normalize_snapshot(snapshot: &Snapshot) -> (Vec<StationRecord>, NormalizeSummary) {
    normalize_all(&snapshot.data, snapshot.last_updated)
}

fn normalize_station(
    entry: &Value,
    brand_label: &str,
    fallback_updated: DateTime<Utc>,
) -> Option<StationRecord> {
    let latitude = try_fields(entry, LATITUDE)?;
    let longitude = try_fields(entry, LONGITUDE)?;

    let grades: BTreeMap<String, f64> = EXTRA_GRADES
        .iter()
        .filter_map(|grade| {
            let nested = format!("prices.{grade}");
            try_fields(entry, &[grade, nested.as_str()]).map(|price| ((*grade).to_string(), price))
        })
        .collect();

    let prices = Prices {
        unleaded: try_fields(entry, UNLEADED).unwrap_or(0.0),
        diesel: try_fields(entry, DIESEL).unwrap_or(0.0),
        premium: try_fields(entry, PREMIUM).unwrap_or(0.0),
        grades,
    };

    let record = StationRecord {
        brand: try_string(entry, &["brand"]).unwrap_or_else(|| brand_label.to_string()),
        latitude,
        longitude,
        prices,
        last_updated: try_timestamp(entry, TIMESTAMP).unwrap_or(fallback_updated),
        address: try_string(entry, ADDRESS),
        postcode: try_string(entry, POSTCODE),
        site_id: try_string(entry, SITE_ID),
    };

    record.is_valid().then_some(record)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;

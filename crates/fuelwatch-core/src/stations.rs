use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Grades every record carries, defaulting to `0.0` when a feed omits them.
pub const CORE_GRADES: [&str; 3] = ["unleaded", "diesel", "premium"];

/// Brand-specific grade codes from the UK open-data feed format. Recorded
/// only when the feed supplies them.
pub const EXTRA_GRADES: [&str; 4] = ["E5", "E10", "B7", "SDV"];

/// Posted prices for one station, in pence per litre as published.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prices {
    pub unleaded: f64,
    pub diesel: f64,
    pub premium: f64,
    #[serde(flatten)]
    pub grades: BTreeMap<String, f64>,
}

impl Prices {
    /// Look up a grade by name, core or extra.
    #[must_use]
    pub fn get(&self, grade: &str) -> Option<f64> {
        match grade {
            "unleaded" => Some(self.unleaded),
            "diesel" => Some(self.diesel),
            "premium" => Some(self.premium),
            other => self.grades.get(other).copied(),
        }
    }

    /// Returns `true` if any grade carries a positive price.
    #[must_use]
    pub fn has_positive(&self) -> bool {
        [self.unleaded, self.diesel, self.premium]
            .into_iter()
            .chain(self.grades.values().copied())
            .any(|price| price > 0.0)
    }
}

/// A single fuel-selling location, normalized across every provider shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRecord {
    pub brand: String,
    pub latitude: f64,
    pub longitude: f64,
    pub prices: Prices,
    pub last_updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
}

impl StationRecord {
    /// Both coordinates finite and at least one positive price.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite() && self.prices.has_positive()
    }
}

use std::cmp::Ordering;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use fuelwatch_core::{StationRecord, CORE_GRADES, EXTRA_GRADES};
use fuelwatch_feeds::{normalize_snapshot, run_cycle};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_collect_error, ApiError, ApiResponse, AppState, ResponseMeta};

const MAX_STATIONS: usize = 10_000;

#[derive(Debug, Deserialize)]
pub(super) struct StationsQuery {
    pub brand: Option<String>,
    pub grade: Option<String>,
    /// Kept as text so a malformed value gets the JSON error envelope.
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StationsData {
    pub last_updated: DateTime<Utc>,
    pub count: usize,
    pub stations: Vec<StationRecord>,
}

fn normalize_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(MAX_STATIONS).clamp(1, MAX_STATIONS)
}

/// Blank means unset; anything else must be a non-negative integer.
fn parse_limit(raw: Option<&str>) -> Result<Option<usize>, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<usize>()
            .map(Some)
            .map_err(|_| format!("limit must be a non-negative integer, got `{value}`")),
    }
}

fn is_known_grade(grade: &str) -> bool {
    CORE_GRADES.contains(&grade) || EXTRA_GRADES.contains(&grade)
}

/// Brand filter is case-insensitive. With a grade, stations lacking a
/// positive price for it are dropped and the rest sorted cheapest first.
fn select_stations(
    mut stations: Vec<StationRecord>,
    brand: Option<&str>,
    grade: Option<&str>,
    limit: usize,
) -> Vec<StationRecord> {
    if let Some(brand) = brand {
        stations.retain(|s| s.brand.eq_ignore_ascii_case(brand));
    }

    if let Some(grade) = grade {
        stations.retain(|s| s.prices.get(grade).is_some_and(|p| p > 0.0));
        stations.sort_by(|a, b| {
            let pa = a.prices.get(grade).unwrap_or(f64::INFINITY);
            let pb = b.prices.get(grade).unwrap_or(f64::INFINITY);
            pa.partial_cmp(&pb).unwrap_or(Ordering::Equal)
        });
    }

    stations.truncate(limit);
    stations
}

/// Collect, normalize, and return station records.
pub(super) async fn list_stations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<StationsQuery>,
) -> Result<Json<ApiResponse<StationsData>>, ApiError> {
    let limit = parse_limit(query.limit.as_deref())
        .map_err(|message| ApiError::new(req_id.0.clone(), "validation_error", message))?;

    if let Some(grade) = query.grade.as_deref() {
        if !is_known_grade(grade) {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                format!("unknown fuel grade `{grade}`"),
            ));
        }
    }

    let outcome = run_cycle(&state.collector, &state.providers)
        .await
        .map_err(|e| map_collect_error(req_id.0.clone(), &e))?;

    let (stations, _summary) = normalize_snapshot(&outcome.snapshot);
    let stations = select_stations(
        stations,
        query.brand.as_deref(),
        query.grade.as_deref(),
        normalize_limit(limit),
    );

    Ok(Json(ApiResponse {
        data: StationsData {
            last_updated: outcome.snapshot.last_updated,
            count: stations.len(),
            stations,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use fuelwatch_core::Prices;

    use super::*;

    fn station(brand: &str, unleaded: f64, diesel: f64) -> StationRecord {
        StationRecord {
            brand: brand.to_string(),
            latitude: 51.5,
            longitude: -0.1,
            prices: Prices {
                unleaded,
                diesel,
                ..Prices::default()
            },
            last_updated: Utc::now(),
            address: None,
            postcode: None,
            site_id: None,
        }
    }

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), MAX_STATIONS);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(50_000)), MAX_STATIONS);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn parse_limit_accepts_blank_and_integers_only() {
        assert_eq!(parse_limit(None), Ok(None));
        assert_eq!(parse_limit(Some(" ")), Ok(None));
        assert_eq!(parse_limit(Some("25")), Ok(Some(25)));
        assert!(parse_limit(Some("abc")).is_err());
        assert!(parse_limit(Some("-3")).is_err());
    }

    #[test]
    fn grade_filter_drops_unpriced_and_sorts_ascending() {
        let stations = vec![
            station("Tesco", 139.9, 0.0),
            station("Shell", 0.0, 149.9),
            station("Asda", 134.9, 0.0),
        ];
        let selected = select_stations(stations, None, Some("unleaded"), 10);
        let brands: Vec<&str> = selected.iter().map(|s| s.brand.as_str()).collect();
        assert_eq!(brands, ["Asda", "Tesco"]);
    }

    #[test]
    fn brand_filter_ignores_case_and_keeps_order() {
        let stations = vec![
            station("TESCO", 139.9, 0.0),
            station("Shell", 135.0, 0.0),
            station("Tesco", 131.0, 0.0),
        ];
        let selected = select_stations(stations, Some("tesco"), None, 10);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].prices.unleaded, 139.9);
    }

    #[test]
    fn known_grades_cover_core_and_extra() {
        assert!(is_known_grade("diesel"));
        assert!(is_known_grade("E10"));
        assert!(!is_known_grade("LPG"));
    }
}

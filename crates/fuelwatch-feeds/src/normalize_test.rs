use serde_json::json;

use super::*;

fn collected_at() -> DateTime<Utc> {
    "2025-03-01T12:00:00Z".parse().unwrap()
}

fn raw(brand: &str, payload: Value) -> RawFetchResult {
    RawFetchResult {
        brand_label: brand.to_string(),
        payload,
    }
}

fn station(lat: f64, lng: f64) -> Value {
    json!({"latitude": lat, "longitude": lng, "unleaded": 140.9})
}

// -----------------------------------------------------------------------
// locate_stations
// -----------------------------------------------------------------------

#[test]
fn locates_all_three_shapes_with_full_length() {
    let entries = vec![station(51.5, -0.1), station(52.0, -1.0), json!({})];

    let bare = json!(entries);
    let nested_stations = json!({"stations": entries});
    let nested_data = json!({"data": entries});

    let (shape, list) = locate_stations(&bare).unwrap();
    assert_eq!(shape, StationShape::BareArray);
    assert_eq!(list.len(), 3);

    let (shape, list) = locate_stations(&nested_stations).unwrap();
    assert_eq!(shape, StationShape::StationsKey);
    assert_eq!(list.len(), 3);

    let (shape, list) = locate_stations(&nested_data).unwrap();
    assert_eq!(shape, StationShape::DataKey);
    assert_eq!(list.len(), 3);
}

#[test]
fn stations_key_wins_over_data_key() {
    let payload = json!({"data": [station(1.0, 1.0)], "stations": [station(2.0, 2.0), station(3.0, 3.0)]});
    let (shape, list) = locate_stations(&payload).unwrap();
    assert_eq!(shape, StationShape::StationsKey);
    assert_eq!(list.len(), 2);
}

#[test]
fn non_array_stations_key_falls_through_to_data() {
    let payload = json!({"stations": {"count": 1}, "data": [station(1.0, 1.0)]});
    let (shape, _) = locate_stations(&payload).unwrap();
    assert_eq!(shape, StationShape::DataKey);
}

#[test]
fn unexpected_key_is_not_located() {
    assert!(locate_stations(&json!({"unexpectedKey": [station(1.0, 1.0)]})).is_none());
    assert!(locate_stations(&json!("just a string")).is_none());
    assert!(locate_stations(&Value::Null).is_none());
}

// -----------------------------------------------------------------------
// normalize_payload
// -----------------------------------------------------------------------

#[test]
fn unexpected_shape_yields_zero_records() {
    let (records, summary) =
        normalize_payload(&raw("Esso", json!({"unexpectedKey": [station(51.5, -0.1)]})), collected_at());
    assert!(records.is_empty());
    assert_eq!(summary.unrecognized_payloads, 1);
    assert_eq!(summary.candidates, 0);
}

#[test]
fn string_latitude_is_coerced() {
    let payload = json!([{"latitude": "51.5", "longitude": "-0.1", "diesel": "151.9"}]);
    let (records, _) = normalize_payload(&raw("BP", payload), collected_at());
    assert_eq!(records.len(), 1);
    assert!((records[0].latitude - 51.5).abs() < f64::EPSILON);
    assert!((records[0].longitude - (-0.1)).abs() < f64::EPSILON);
    assert!((records[0].prices.diesel - 151.9).abs() < f64::EPSILON);
}

#[test]
fn unparseable_latitude_without_fallback_is_dropped() {
    let payload = json!([{"latitude": "not-a-number", "longitude": -0.1, "unleaded": 140.9}]);
    let (records, summary) = normalize_payload(&raw("BP", payload), collected_at());
    assert!(records.is_empty());
    assert_eq!(summary.candidates, 1);
    assert_eq!(summary.dropped, 1);
}

#[test]
fn unparseable_latitude_falls_back_to_lat_then_capitalized() {
    let payload = json!([
        {"latitude": "not-a-number", "lat": "52.2", "lng": -1.5, "unleaded": 140.9},
        {"Latitude": 53.3, "Longitude": "-2.2", "unleaded": 140.9}
    ]);
    let (records, _) = normalize_payload(&raw("JET", payload), collected_at());
    assert_eq!(records.len(), 2);
    assert!((records[0].latitude - 52.2).abs() < f64::EPSILON);
    assert!((records[0].longitude - (-1.5)).abs() < f64::EPSILON);
    assert!((records[1].latitude - 53.3).abs() < f64::EPSILON);
    assert!((records[1].longitude - (-2.2)).abs() < f64::EPSILON);
}

#[test]
fn all_zero_prices_are_dropped() {
    let payload = json!([{"latitude": 51.5, "longitude": -0.1, "unleaded": 0, "diesel": 0, "premium": 0}]);
    let (records, summary) = normalize_payload(&raw("Moto", payload), collected_at());
    assert!(records.is_empty());
    assert_eq!(summary.dropped, 1);
}

#[test]
fn missing_prices_default_to_zero() {
    let payload = json!([{"latitude": 51.5, "longitude": -0.1, "premium": 165.9}]);
    let (records, _) = normalize_payload(&raw("Moto", payload), collected_at());
    assert_eq!(records.len(), 1);
    assert!(records[0].prices.unleaded.abs() < f64::EPSILON);
    assert!(records[0].prices.diesel.abs() < f64::EPSILON);
    assert!(records[0].prices.grades.is_empty());
}

#[test]
fn price_fallback_chain_is_ordered() {
    let payload = json!([
        {"latitude": 51.5, "longitude": -0.1, "prices": {"unleaded": 139.9}, "UnleadedPrice": 150.0},
        {"latitude": 51.5, "longitude": -0.1, "DieselPrice": "155.5"},
        {"latitude": 51.5, "longitude": -0.1, "unleaded": "n/a", "prices": {"unleaded": "141.0"}}
    ]);
    let (records, _) = normalize_payload(&raw("Rontec", payload), collected_at());
    assert_eq!(records.len(), 3);
    assert!((records[0].prices.unleaded - 139.9).abs() < f64::EPSILON);
    assert!((records[1].prices.diesel - 155.5).abs() < f64::EPSILON);
    assert!((records[2].prices.unleaded - 141.0).abs() < f64::EPSILON);
}

#[test]
fn brand_falls_back_to_provider_label() {
    let payload = json!([
        {"brand": "ESSO", "latitude": 51.5, "longitude": -0.1, "unleaded": 140.9},
        {"brand": "", "latitude": 51.5, "longitude": -0.1, "unleaded": 140.9},
        {"latitude": 51.5, "longitude": -0.1, "unleaded": 140.9}
    ]);
    let (records, _) = normalize_payload(&raw("Tesco", payload), collected_at());
    let brands: Vec<&str> = records.iter().map(|r| r.brand.as_str()).collect();
    assert_eq!(brands, vec!["ESSO", "Tesco", "Tesco"]);
}

#[test]
fn timestamp_prefers_entry_then_payload_then_collection_time() {
    let payload = json!({
        "last_updated": "01/03/2025 08:15:00",
        "stations": [
            {"latitude": 51.5, "longitude": -0.1, "unleaded": 140.9, "last_updated": "2025-02-28T18:00:00Z"},
            {"latitude": 51.5, "longitude": -0.1, "unleaded": 140.9}
        ]
    });
    let (records, _) = normalize_payload(&raw("Asda", payload), collected_at());
    assert_eq!(records[0].last_updated.to_rfc3339(), "2025-02-28T18:00:00+00:00");
    assert_eq!(records[1].last_updated.to_rfc3339(), "2025-03-01T08:15:00+00:00");

    let bare = json!([{"latitude": 51.5, "longitude": -0.1, "unleaded": 140.9, "last_updated": "garbage"}]);
    let (records, _) = normalize_payload(&raw("Asda", bare), collected_at());
    assert_eq!(records[0].last_updated, collected_at());
}

#[test]
fn uk_open_data_shape_yields_extra_grades() {
    let payload = json!({
        "last_updated": "01/03/2025 07:00:00",
        "stations": [{
            "site_id": "gbusd0123",
            "brand": "SAINSBURYS",
            "address": "Kings Road, London",
            "postcode": "SW3 4NP",
            "location": {"latitude": "51.4875", "longitude": -0.1687},
            "prices": {"E5": 152.9, "E10": 142.9, "B7": 151.9}
        }]
    });
    let (records, summary) = normalize_payload(&raw("Sainsburys", payload), collected_at());
    assert_eq!(summary.emitted, 1);
    let record = &records[0];
    assert_eq!(record.brand, "SAINSBURYS");
    assert!((record.latitude - 51.4875).abs() < f64::EPSILON);
    assert_eq!(record.prices.get("E10"), Some(142.9));
    assert_eq!(record.prices.get("B7"), Some(151.9));
    assert_eq!(record.prices.get("SDV"), None);
    assert!(record.prices.unleaded.abs() < f64::EPSILON);
    assert_eq!(record.address.as_deref(), Some("Kings Road, London"));
    assert_eq!(record.postcode.as_deref(), Some("SW3 4NP"));
    assert_eq!(record.site_id.as_deref(), Some("gbusd0123"));
}

#[test]
fn extra_grade_prefers_top_level_over_nested() {
    let payload = json!([
        {"latitude": 51.5, "longitude": -0.1, "E5": 140.0, "prices": {"E5": 150.0}},
        {"latitude": 51.5, "longitude": -0.1, "E10": "n/a", "prices": {"E10": 138.5}}
    ]);
    let (records, _) = normalize_payload(&raw("Applegreen", payload), collected_at());
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].prices.get("E5"), Some(140.0));
    assert_eq!(records[1].prices.get("E10"), Some(138.5));
}

#[test]
fn extreme_epoch_timestamp_falls_back_instead_of_panicking() {
    let payload = json!([
        {"latitude": 51.5, "longitude": -0.1, "unleaded": 140.9, "last_updated": i64::MIN},
        {"latitude": 51.5, "longitude": -0.1, "unleaded": 140.9, "last_updated": i64::MAX}
    ]);
    let (records, summary) = normalize_payload(&raw("Jet", payload), collected_at());
    assert_eq!(summary.emitted, 2);
    assert!(records.iter().all(|r| r.last_updated == collected_at()));
}

#[test]
fn non_object_entries_are_dropped_not_fatal() {
    let payload = json!([42, "station", null, station(51.5, -0.1)]);
    let (records, summary) = normalize_payload(&raw("SGN", payload), collected_at());
    assert_eq!(records.len(), 1);
    assert_eq!(summary.candidates, 4);
    assert_eq!(summary.dropped, 3);
}

// -----------------------------------------------------------------------
// normalize_all / normalize_snapshot
// -----------------------------------------------------------------------

#[test]
fn one_bad_payload_does_not_affect_others() {
    let results = vec![
        raw("A", json!([station(51.5, -0.1)])),
        raw("B", json!({"unexpectedKey": []})),
        raw("C", json!({"data": [station(52.0, -1.0), station(53.0, -2.0)]})),
    ];
    let (records, summary) = normalize_all(&results, collected_at());
    assert_eq!(records.len(), 3);
    assert_eq!(summary.payloads, 3);
    assert_eq!(summary.unrecognized_payloads, 1);
    assert_eq!(summary.emitted, 3);
    assert_eq!(records[0].brand, "A");
    assert_eq!(records[2].brand, "C");
}

#[test]
fn snapshot_uses_its_timestamp_as_collection_time() {
    let snapshot = Snapshot::new(collected_at(), vec![raw("A", json!([station(51.5, -0.1)]))]);
    let (records, _) = normalize_snapshot(&snapshot);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].last_updated, collected_at());
}

//! `stations` command handler.

use std::path::Path;

use fuelwatch_core::StationRecord;
use fuelwatch_feeds::{normalize_snapshot, read_snapshot};

/// # Errors
///
/// Returns an error if the snapshot cannot be read or parsed.
pub(crate) async fn run_stations(input: &Path, json: bool) -> anyhow::Result<()> {
    let snapshot = read_snapshot(input).await?;
    let (stations, summary) = normalize_snapshot(&snapshot);

    if json {
        println!("{}", serde_json::to_string_pretty(&stations)?);
    } else {
        print!("{}", render_table(&stations));
        println!(
            "{} stations from {} brands ({} dropped, {} unrecognized payloads), snapshot {}",
            summary.emitted,
            summary.payloads,
            summary.dropped,
            summary.unrecognized_payloads,
            snapshot.last_updated.to_rfc3339()
        );
    }

    Ok(())
}

fn price_cell(price: f64) -> String {
    if price > 0.0 {
        format!("{price:.1}")
    } else {
        "-".to_string()
    }
}

fn other_grades(station: &StationRecord) -> String {
    station
        .prices
        .grades
        .iter()
        .map(|(grade, price)| format!("{grade}={price:.1}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn table_row(s: &StationRecord) -> String {
    format!(
        "{:<20} {:>10.5} {:>10.5} {:>9} {:>9} {:>9} {:<10} {}\n",
        s.brand,
        s.latitude,
        s.longitude,
        price_cell(s.prices.get("unleaded").unwrap_or_default()),
        price_cell(s.prices.get("diesel").unwrap_or_default()),
        price_cell(s.prices.get("premium").unwrap_or_default()),
        s.postcode.as_deref().unwrap_or("-"),
        other_grades(s),
    )
}

pub(crate) fn render_table(stations: &[StationRecord]) -> String {
    let header = format!(
        "{:<20} {:>10} {:>10} {:>9} {:>9} {:>9} {:<10} OTHER\n",
        "BRAND", "LAT", "LON", "UNLEADED", "DIESEL", "PREMIUM", "POSTCODE"
    );
    std::iter::once(header)
        .chain(stations.iter().map(table_row))
        .collect()
}

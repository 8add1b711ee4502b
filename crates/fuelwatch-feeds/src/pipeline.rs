//! One collection cycle: fan out, join, stamp.

use chrono::Utc;
use fuelwatch_core::{ProviderSpec, Snapshot};

use crate::collector::{CollectionReport, Collector};
use crate::error::CollectError;

#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub snapshot: Snapshot,
    pub report: CollectionReport,
}

/// Run one collection cycle and package the successful payloads as a
/// [`Snapshot`] stamped at completion.
///
/// A snapshot with fewer brands than providers (even zero) is a normal
/// outcome; only an orchestration failure is an error.
///
/// # Errors
///
/// Propagates [`CollectError`] from [`Collector::collect`].
pub async fn run_cycle(
    collector: &Collector,
    providers: &[ProviderSpec],
) -> Result<CycleOutcome, CollectError> {
    let collection = collector.collect(providers).await?;

    if collection.results.is_empty() && !providers.is_empty() {
        tracing::warn!(
            attempted = collection.report.attempted,
            "no provider returned data this cycle"
        );
    }

    Ok(CycleOutcome {
        snapshot: Snapshot::new(Utc::now(), collection.results),
        report: collection.report,
    })
}

use axum::{extract::State, Extension, Json};
use fuelwatch_core::Snapshot;
use fuelwatch_feeds::run_cycle;

use crate::middleware::RequestId;

use super::{map_collect_error, ApiError, AppState};

/// Run a fresh collection cycle and return the raw snapshot.
///
/// The body is the bare snapshot artifact, not the usual envelope, so it is
/// interchangeable with the file the scheduler writes.
pub(super) async fn get_fuel_prices(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<Snapshot>, ApiError> {
    let outcome = run_cycle(&state.collector, &state.providers)
        .await
        .map_err(|e| map_collect_error(req_id.0.clone(), &e))?;

    tracing::info!(
        request_id = %req_id.0,
        brands = outcome.snapshot.data.len(),
        failed = outcome.report.failures.len(),
        "served fuel prices"
    );

    Ok(Json(outcome.snapshot))
}

//! Background job scheduler.
//!
//! Keeps the snapshot file fresh: every tick of `FUELWATCH_SNAPSHOT_CRON`
//! runs one collection cycle and rewrites the artifact.

use std::path::Path;
use std::sync::Arc;

use fuelwatch_core::AppConfig;
use fuelwatch_feeds::{run_cycle, write_snapshot, CollectionReport};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;

/// Builds and starts the background job scheduler.
///
/// The returned [`JobScheduler`] must be kept alive for the lifetime of the
/// process; dropping it stops the job. One refresh is also kicked off
/// immediately so the file exists before the first tick.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the cron expression is invalid or the
/// scheduler cannot be started.
pub async fn build_scheduler(
    state: AppState,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_snapshot_job(&scheduler, state.clone(), Arc::clone(&config)).await?;
    scheduler.start().await?;

    tokio::spawn(async move {
        run_snapshot_job(&state, &config.snapshot_path).await;
    });

    Ok(scheduler)
}

async fn register_snapshot_job(
    scheduler: &JobScheduler,
    state: AppState,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    let cron = config.snapshot_cron.clone();
    let job_config = Arc::clone(&config);
    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let state = state.clone();
        let config = Arc::clone(&job_config);

        Box::pin(async move {
            run_snapshot_job(&state, &config.snapshot_path).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, path = %config.snapshot_path.display(), "registered snapshot job");
    Ok(())
}

async fn run_snapshot_job(state: &AppState, path: &Path) {
    tracing::info!("scheduler: starting snapshot refresh");
    match refresh_snapshot(state, path).await {
        Ok(report) => tracing::info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            "scheduler: snapshot refresh complete"
        ),
        Err(e) => tracing::error!(error = %e, "scheduler: snapshot refresh failed"),
    }
}

/// One collection cycle written to `path`. The previous file is left intact
/// when either step fails.
pub(crate) async fn refresh_snapshot(
    state: &AppState,
    path: &Path,
) -> anyhow::Result<CollectionReport> {
    let outcome = run_cycle(&state.collector, &state.providers).await?;
    write_snapshot(path, &outcome.snapshot).await?;
    Ok(outcome.report)
}

#[cfg(test)]
mod tests {
    use fuelwatch_core::ProviderSpec;
    use fuelwatch_feeds::{read_snapshot, Collector, FeedClient};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn refresh_writes_snapshot_with_healthy_brands_only() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tesco.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stations": []})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/esso.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = FeedClient::new(500, "fuelwatch-test/0.1").expect("client");
        let state = AppState {
            collector: Collector::new(client),
            providers: vec![
                ProviderSpec::new("Tesco", format!("{}/tesco.json", server.uri())),
                ProviderSpec::new("Esso", format!("{}/esso.json", server.uri())),
            ]
            .into(),
        };

        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("public").join("fuel-prices.json");

        let report = refresh_snapshot(&state, &target).await.expect("refresh");
        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 1);

        let snapshot = read_snapshot(&target).await.expect("read back");
        assert_eq!(snapshot.brands(), ["Tesco"]);
        assert_eq!(snapshot.data[0].payload, json!({"stations": []}));
    }
}

mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use fuelwatch_feeds::{Collector, FeedClient};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(fuelwatch_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let providers = fuelwatch_core::load_providers(config.providers_path.as_deref())?;
    let client = FeedClient::from_config(&config)?;
    let state = AppState {
        collector: Collector::new(client),
        providers,
    };

    tracing::info!(
        env = %config.env,
        providers = state.providers.len(),
        timeout_ms = config.fetch_timeout_ms,
        "starting fuelwatch-server"
    );

    let _scheduler = if config.scheduler_enabled {
        Some(scheduler::build_scheduler(state.clone(), Arc::clone(&config)).await?)
    } else {
        tracing::info!("scheduler disabled; snapshots will not be written");
        None
    };

    let app = build_app(state, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

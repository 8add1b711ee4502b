//! `collect` command handler.

use std::path::Path;

use fuelwatch_core::AppConfig;
use fuelwatch_feeds::{run_cycle, write_snapshot, Collector, FeedClient, ProxyChain};

/// Run one collection cycle and write the snapshot to `output`.
///
/// Providers that fail are listed on stdout but do not fail the command; a
/// snapshot with fewer brands (even none) is still written.
///
/// # Errors
///
/// Returns an error if the provider table or HTTP client cannot be built,
/// the cycle fails as a whole, or the snapshot cannot be written.
pub(crate) async fn run_collect(
    config: &AppConfig,
    output: &Path,
    dry_run: bool,
    via_proxies: bool,
) -> anyhow::Result<()> {
    let providers = fuelwatch_core::load_providers(config.providers_path.as_deref())?;

    if dry_run {
        let brands: Vec<&str> = providers.iter().map(|p| p.brand_label.as_str()).collect();
        println!(
            "dry-run: would collect {} providers into {}: [{}]",
            providers.len(),
            output.display(),
            brands.join(", ")
        );
        return Ok(());
    }

    let client = FeedClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build feed client: {e}"))?;
    let collector = if via_proxies {
        Collector::via_proxies(client, ProxyChain::public_cors_proxies())
    } else {
        Collector::new(client)
    };

    let outcome = run_cycle(&collector, &providers).await?;
    write_snapshot(output, &outcome.snapshot).await?;

    println!("{}", summary_line(&outcome.report, output));
    for failure in &outcome.report.failures {
        println!("  failed: {:<20} {}", failure.brand_label, failure.reason);
    }

    Ok(())
}

pub(crate) fn summary_line(report: &fuelwatch_feeds::CollectionReport, output: &Path) -> String {
    format!(
        "collected {}/{} providers in {} ms -> {}",
        report.succeeded,
        report.attempted,
        report.elapsed.as_millis(),
        output.display()
    )
}

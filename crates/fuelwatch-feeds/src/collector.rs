//! Concurrent fan-out over the provider table.
//!
//! Every provider is fetched in its own task and the tasks are joined
//! all-settled style: each task owns its result slot, and one provider's
//! failure only removes that provider from the output.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fuelwatch_core::{ProviderSpec, RawFetchResult};
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::client::FeedClient;
use crate::error::{CollectError, FetchError};
use crate::proxy::ProxyChain;

/// A provider that was attempted but contributed no payload this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub brand_label: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<ProviderFailure>,
    pub elapsed: Duration,
}

/// Output of one collection: successful payloads in provider-table order.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub results: Vec<RawFetchResult>,
    pub report: CollectionReport,
}

type FetchFn =
    Arc<dyn Fn(ProviderSpec) -> BoxFuture<'static, Result<RawFetchResult, FetchError>> + Send + Sync>;

/// Runs one fetch per provider per cycle. Cheap to clone.
#[derive(Clone)]
pub struct Collector {
    fetch: FetchFn,
}

impl fmt::Debug for Collector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector").finish_non_exhaustive()
    }
}

impl Collector {
    /// Fetch each endpoint directly.
    #[must_use]
    pub fn new(client: FeedClient) -> Self {
        Self::from_fn(move |provider| {
            let client = client.clone();
            async move { client.fetch_provider(&provider).await }
        })
    }

    /// Route every provider fetch through `proxies` instead of hitting the
    /// endpoint directly.
    #[must_use]
    pub fn via_proxies(client: FeedClient, proxies: ProxyChain) -> Self {
        let proxies = Arc::new(proxies);
        Self::from_fn(move |provider| {
            let client = client.clone();
            let proxies = Arc::clone(&proxies);
            async move {
                let payload = proxies.fetch_json(&client, &provider.endpoint).await?;
                Ok(RawFetchResult {
                    brand_label: provider.brand_label,
                    payload,
                })
            }
        })
    }

    /// Use `fetch` for every provider. Each call runs in its own task.
    #[must_use]
    pub fn from_fn<F, Fut>(fetch: F) -> Self
    where
        F: Fn(ProviderSpec) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RawFetchResult, FetchError>> + Send + 'static,
    {
        Self {
            fetch: Arc::new(move |provider| fetch(provider).boxed()),
        }
    }

    /// Fetch every provider concurrently, one attempt each.
    ///
    /// Providers that time out, answer non-2xx, or return an unparseable body
    /// are logged at warn level and omitted.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Orchestration`] only if a fetch task itself
    /// panicked or was cancelled. Provider failures never produce an error.
    pub async fn collect(&self, providers: &[ProviderSpec]) -> Result<Collection, CollectError> {
        let started = Instant::now();

        let handles: Vec<_> = providers
            .iter()
            .cloned()
            .map(|provider| tokio::spawn((self.fetch)(provider)))
            .collect();

        let settled = futures::future::join_all(handles).await;

        let mut results = Vec::with_capacity(providers.len());
        let mut failures = Vec::new();

        for (provider, outcome) in providers.iter().zip(settled) {
            match outcome {
                Ok(Ok(result)) => {
                    tracing::debug!(brand = %provider.brand_label, "fetched provider feed");
                    results.push(result);
                }
                Ok(Err(error)) => {
                    tracing::warn!(
                        brand = %provider.brand_label,
                        endpoint = %provider.endpoint,
                        error = %error,
                        "failed to fetch provider feed"
                    );
                    failures.push(ProviderFailure {
                        brand_label: provider.brand_label.clone(),
                        reason: error.to_string(),
                    });
                }
                Err(join_error) => {
                    return Err(CollectError::Orchestration {
                        brand: provider.brand_label.clone(),
                        source: join_error,
                    });
                }
            }
        }

        let report = CollectionReport {
            attempted: providers.len(),
            succeeded: results.len(),
            failures,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failures.len(),
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            "collection complete"
        );

        Ok(Collection { results, report })
    }

    /// Like [`Collector::collect`] but never fails: an orchestration failure
    /// is logged at error level and yields an empty sequence.
    pub async fn collect_or_empty(&self, providers: &[ProviderSpec]) -> Vec<RawFetchResult> {
        match self.collect(providers).await {
            Ok(collection) => collection.results,
            Err(error) => {
                tracing::error!(error = %error, "collection cycle failed");
                Vec::new()
            }
        }
    }
}

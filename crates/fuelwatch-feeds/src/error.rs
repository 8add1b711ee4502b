use thiserror::Error;

/// Failure fetching a single feed. Always scoped to one provider.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid feed URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("proxy envelope for {url} is malformed: {reason}")]
    ProxyEnvelope { url: String, reason: String },

    #[error("proxy chain is empty")]
    EmptyProxyChain,

    #[error("all {attempts} proxies failed for {url}: {last}")]
    AllProxiesFailed {
        url: String,
        attempts: usize,
        #[source]
        last: Box<FetchError>,
    },
}

/// Failure of the collection cycle as a whole, as opposed to any one provider.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("fetch task for {brand} did not complete: {source}")]
    Orchestration {
        brand: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot at {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

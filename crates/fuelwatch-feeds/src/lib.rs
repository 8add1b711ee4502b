pub mod client;
pub mod collector;
pub mod error;
pub mod fields;
pub mod normalize;
pub mod pipeline;
pub mod proxy;
pub mod snapshot;

pub use client::FeedClient;
pub use collector::{Collection, CollectionReport, Collector, ProviderFailure};
pub use error::{CollectError, FetchError, SnapshotError};
pub use normalize::{
    locate_stations, normalize_all, normalize_payload, normalize_snapshot, NormalizeSummary,
    StationShape,
};
pub use pipeline::{run_cycle, CycleOutcome};
pub use proxy::{EndpointTransform, ProxyChain};
pub use snapshot::{read_snapshot, write_snapshot};

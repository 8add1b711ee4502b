pub mod app_config;
pub mod config;
pub mod providers;
pub mod snapshot;
pub mod stations;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use providers::{default_providers, load_providers, ProviderSpec, ProvidersFile};
pub use snapshot::{RawFetchResult, Snapshot};
pub use stations::{Prices, StationRecord, CORE_GRADES, EXTRA_GRADES};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read providers file {path}: {source}")]
    ProvidersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse providers file: {0}")]
    ProvidersFileParse(#[source] serde_yaml::Error),

    #[error("providers validation failed: {0}")]
    Validation(String),
}

use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings shared by the server and the CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// YAML override for the provider table. `None` selects the built-in table.
    pub providers_path: Option<PathBuf>,
    /// Per-provider request timeout in milliseconds.
    pub fetch_timeout_ms: u64,
    pub user_agent: String,
    /// Where the scheduled job writes the aggregated snapshot.
    pub snapshot_path: PathBuf,
    /// Six-field cron expression (seconds first) for the snapshot job.
    pub snapshot_cron: String,
    pub scheduler_enabled: bool,
}

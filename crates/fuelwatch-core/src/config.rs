use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Browser-like `User-Agent` sent to provider feeds by default. Several
/// retailer CDNs reject requests that do not look like a desktop browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default per-provider fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;

/// Every 30 minutes, on the minute.
pub const DEFAULT_SNAPSHOT_CRON: &str = "0 */30 * * * *";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let env = parse_environment(&or_default("FUELWATCH_ENV", "development"))?;

    let bind_addr = or_default("FUELWATCH_BIND_ADDR", "0.0.0.0:3001")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("FUELWATCH_BIND_ADDR", e.to_string()))?;

    let log_level = or_default("FUELWATCH_LOG_LEVEL", "info");

    let providers_path = lookup("FUELWATCH_PROVIDERS_PATH")
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from);

    let fetch_timeout_ms = or_default(
        "FUELWATCH_FETCH_TIMEOUT_MS",
        &DEFAULT_FETCH_TIMEOUT_MS.to_string(),
    )
    .parse::<u64>()
    .map_err(|e| invalid("FUELWATCH_FETCH_TIMEOUT_MS", e.to_string()))?;
    if fetch_timeout_ms == 0 {
        return Err(invalid(
            "FUELWATCH_FETCH_TIMEOUT_MS",
            "timeout must be greater than zero".to_string(),
        ));
    }

    let user_agent = or_default("FUELWATCH_USER_AGENT", DEFAULT_USER_AGENT);
    let snapshot_path = PathBuf::from(or_default(
        "FUELWATCH_SNAPSHOT_PATH",
        "./public/fuel-prices.json",
    ));
    let snapshot_cron = or_default("FUELWATCH_SNAPSHOT_CRON", DEFAULT_SNAPSHOT_CRON);

    let scheduler_enabled = parse_bool(&or_default("FUELWATCH_SCHEDULER_ENABLED", "true"))
        .ok_or_else(|| {
            invalid(
                "FUELWATCH_SCHEDULER_ENABLED",
                "expected true/false".to_string(),
            )
        })?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        providers_path,
        fetch_timeout_ms,
        user_agent,
        snapshot_path,
        snapshot_cron,
        scheduler_enabled,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FUELWATCH_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

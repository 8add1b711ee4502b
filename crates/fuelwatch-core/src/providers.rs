//! The provider table: one entry per retailer publishing a fuel-price feed.
//!
//! The built-in table lives in [`default_providers`]; a YAML file can replace
//! it at startup. Either way the table is loaded once and shared by every
//! entry point.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A single retailer feed: where to fetch it and how to label its stations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpec {
    #[serde(rename = "brand")]
    pub brand_label: String,
    #[serde(rename = "url")]
    pub endpoint: String,
}

impl ProviderSpec {
    #[must_use]
    pub fn new(brand_label: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            brand_label: brand_label.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProvidersFile {
    pub providers: Vec<ProviderSpec>,
}

const UK_RETAILERS: &[(&str, &str)] = &[
    ("Applegreen", "https://applegreenstores.com/fuel-prices/data.json"),
    ("Ascona", "https://fuelprices.asconagroup.co.uk/newfuel.json"),
    ("Asda", "https://storelocator.asda.com/fuel_prices_data.json"),
    (
        "BP",
        "https://www.bp.com/en_gb/united-kingdom/home/fuelprices/fuel_prices_data.json",
    ),
    ("Esso", "https://fuelprices.esso.co.uk/latestdata.json"),
    ("JET", "https://jetlocal.co.uk/fuel_prices_data.json"),
    (
        "Karan Retail",
        "https://api2.krlmedia.com/integration/live_price/krl",
    ),
    ("Morrisons", "https://www.morrisons.com/fuel-prices/fuel.json"),
    ("Moto", "https://moto-way.com/fuel-price/fuel_prices.json"),
    ("MFG", "https://fuel.motorfuelgroup.com/fuel_prices_data.json"),
    (
        "Rontec",
        "https://www.rontec-servicestations.co.uk/fuel-prices/data/fuel_prices_data.json",
    ),
    (
        "Sainsburys",
        "https://api.sainsburys.co.uk/v1/exports/latest/fuel_prices_data.json",
    ),
    (
        "SGN",
        "https://www.sgnretail.uk/files/data/SGN_daily_fuel_prices.json",
    ),
    ("Tesco", "https://www.tesco.com/fuel_prices/fuel_prices_data.json"),
];

/// The built-in table of UK retailer feeds.
#[must_use]
pub fn default_providers() -> Arc<[ProviderSpec]> {
    UK_RETAILERS
        .iter()
        .map(|(brand, url)| ProviderSpec::new(*brand, *url))
        .collect()
}

/// Resolve the provider table: the YAML file at `path` when given, otherwise
/// the built-in table.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_providers(path: Option<&Path>) -> Result<Arc<[ProviderSpec]>, ConfigError> {
    let Some(path) = path else {
        return Ok(default_providers());
    };

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProvidersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: ProvidersFile =
        serde_yaml::from_str(&content).map_err(ConfigError::ProvidersFileParse)?;

    validate_providers(&file.providers)?;

    Ok(file.providers.into())
}

fn validate_providers(providers: &[ProviderSpec]) -> Result<(), ConfigError> {
    if providers.is_empty() {
        return Err(ConfigError::Validation(
            "at least one provider is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();

    for provider in providers {
        let brand = provider.brand_label.trim();
        if brand.is_empty() {
            return Err(ConfigError::Validation(
                "provider brand must be non-empty".to_string(),
            ));
        }

        let endpoint = provider.endpoint.trim();
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ConfigError::Validation(format!(
                "provider '{brand}' has non-http endpoint '{endpoint}'"
            )));
        }

        if !seen.insert(brand.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate provider brand: '{brand}'"
            )));
        }
    }

    Ok(())
}

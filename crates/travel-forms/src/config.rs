// File: src/config.rs
// Purpose: Injected form data: destination catalog, price table, lookup latency

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const TRIP_ONE_WAY: &str = "oneway";
pub const TRIP_ROUND: &str = "roundtrip";

pub const CLASS_TOURIST: &str = "tourist";
pub const CLASS_BUSINESS: &str = "business";
pub const CLASS_FIRST: &str = "first";

/// Catalog and pricing data the form operates on.
///
/// Injected rather than embedded so tests and localized deployments can
/// swap the defaults without touching the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormOptions {
    #[serde(default = "default_destinations")]
    pub destinations: Vec<String>,

    /// Base price per travel class; unknown classes price to zero
    #[serde(default = "default_prices")]
    pub prices: HashMap<String, u32>,

    /// Simulated latency of the email-uniqueness lookup
    #[serde(default = "default_lookup_latency_ms")]
    pub lookup_latency_ms: u64,
}

fn default_destinations() -> Vec<String> {
    ["Barcelona", "Madrid", "Valencia", "Sevilla", "Bilbao", "Mallorca"]
        .map(String::from)
        .to_vec()
}

fn default_prices() -> HashMap<String, u32> {
    HashMap::from([
        (CLASS_TOURIST.to_string(), 100),
        (CLASS_BUSINESS.to_string(), 250),
        (CLASS_FIRST.to_string(), 500),
    ])
}

fn default_lookup_latency_ms() -> u64 {
    1000
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            destinations: default_destinations(),
            prices: default_prices(),
            lookup_latency_ms: default_lookup_latency_ms(),
        }
    }
}

impl FormOptions {
    /// Load options from a TOML file; a missing or empty file yields the
    /// defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let options: FormOptions = toml::from_str(&content)
            .with_context(|| format!("Failed to parse options file: {:?}", path))?;

        Ok(options)
    }

    /// Base price for a travel class; unrecognized classes map to 0.
    pub fn base_price(&self, class: &str) -> u32 {
        self.prices.get(class).copied().unwrap_or(0)
    }

    pub fn lookup_latency(&self) -> Duration {
        Duration::from_millis(self.lookup_latency_ms)
    }
}

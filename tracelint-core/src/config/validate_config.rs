//! Validation run configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const CONFIG_FILE_NAME: &str = "tracelint.toml";

const DEFAULT_CATALOG_URL: &str = "https://api.coingecko.com/api/v3/coins/list";
const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 30;

/// Configuration for a validation run.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`TRACELINT_*`)
/// 2. Project config (`tracelint.toml` in the registry root)
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ValidateConfig {
    pub catalog: CatalogSection,
    pub snapshot: SnapshotSection,
}

/// External price-feed catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogSection {
    pub url: String,
    pub timeout_secs: u64,
    /// Skip the catalog fetch entirely; dependent checks become
    /// inconclusive instead of failing.
    pub offline: bool,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            timeout_secs: DEFAULT_CATALOG_TIMEOUT_SECS,
            offline: false,
        }
    }
}

/// Snapshot loading settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SnapshotSection {
    /// Worker threads for the per-chain snapshot load. 0 lets rayon pick.
    pub threads: usize,
}

impl Default for SnapshotSection {
    fn default() -> Self {
        Self { threads: 0 }
    }
}

impl ValidateConfig {
    /// Load configuration for a registry rooted at `root`.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let file = root.join(CONFIG_FILE_NAME);
        if file.exists() {
            let text = std::fs::read_to_string(&file).map_err(|e| ConfigError::Io {
                path: file.display().to_string(),
                message: e.to_string(),
            })?;
            config = toml::from_str(&text).map_err(|e| ConfigError::Parse {
                path: file.display().to_string(),
                message: e.to_string(),
            })?;
        }

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `TRACELINT_*` environment overrides. Unparseable values are
    /// ignored with a warning rather than failing the run.
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("TRACELINT_CATALOG_URL") {
            if !url.is_empty() {
                self.catalog.url = url;
            }
        }
        if let Ok(raw) = std::env::var("TRACELINT_OFFLINE") {
            match raw.as_str() {
                "1" | "true" | "yes" => self.catalog.offline = true,
                "0" | "false" | "no" => self.catalog.offline = false,
                other => tracing::warn!(value = other, "ignoring invalid TRACELINT_OFFLINE"),
            }
        }
        if let Ok(raw) = std::env::var("TRACELINT_CATALOG_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) => self.catalog.timeout_secs = secs,
                Err(_) => {
                    tracing::warn!(value = %raw, "ignoring invalid TRACELINT_CATALOG_TIMEOUT_SECS")
                }
            }
        }
        if let Ok(raw) = std::env::var("TRACELINT_SNAPSHOT_THREADS") {
            match raw.parse::<usize>() {
                Ok(n) => self.snapshot.threads = n,
                Err(_) => {
                    tracing::warn!(value = %raw, "ignoring invalid TRACELINT_SNAPSHOT_THREADS")
                }
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "catalog.timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

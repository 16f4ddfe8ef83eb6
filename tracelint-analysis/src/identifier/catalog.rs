//! External price-feed catalog collaborator.
//!
//! One fetch per run, read-only. An unreachable catalog is never fatal:
//! the runner degrades the dependent checks to inconclusive.

use std::time::Duration;

use serde::Deserialize;
use tracelint_core::errors::CatalogError;
use tracelint_core::types::collections::FxHashMap;

/// One catalog listing.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
}

/// The fetched catalog, indexed by identifier.
#[derive(Debug, Default)]
pub struct Catalog {
    by_id: FxHashMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut by_id = FxHashMap::default();
        for entry in entries {
            by_id.insert(entry.id.clone(), entry);
        }
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Source of catalog data. The engine takes this as a trait so runs can
/// inject a fixture instead of the network.
pub trait CatalogSource {
    fn fetch(&self) -> Result<Vec<CatalogEntry>, CatalogError>;
}

/// The real collaborator: one blocking GET with a timeout.
pub struct HttpCatalogSource {
    url: String,
    timeout: Duration,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        tracing::info!(url = %self.url, "fetching price identifier catalog");
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .build()
            .into();
        let mut response = agent
            .get(&self.url)
            .call()
            .map_err(|e| CatalogError::Http(e.to_string()))?;
        response
            .body_mut()
            .read_json::<Vec<CatalogEntry>>()
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

/// Fixed catalog contents, for tests and offline runs.
pub struct StaticCatalogSource(pub Vec<CatalogEntry>);

impl CatalogSource for StaticCatalogSource {
    fn fetch(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        Ok(self.0.clone())
    }
}

//! Immutable per-run view of the registry.
//!
//! The snapshot is loaded once at run start and passed down read-only;
//! there is no global registry cache to go stale. Sync utilities that
//! write records reload a fresh snapshot instead of patching this one.

use rayon::prelude::*;
use tracelint_core::errors::StoreError;
use tracelint_core::types::collections::FxHashMap;
use tracelint_core::types::{AssetId, NetworkType};

use crate::layout::{ChainDir, NETWORK_ROOTS};
use crate::records::{Asset, AssetListRecord, ChainRecord, ConnectionRecord};
use crate::store::RegistryStore;

/// One chain's records plus its location in the tree.
#[derive(Debug, Clone)]
pub struct ChainEntry {
    pub dir: ChainDir,
    pub record: ChainRecord,
    pub assets: Option<AssetListRecord>,
}

impl ChainEntry {
    pub fn asset_list(&self) -> &[Asset] {
        self.assets.as_ref().map(|a| a.assets.as_slice()).unwrap_or(&[])
    }
}

/// Read-only view of every record in the registry, indexed by identity.
#[derive(Debug, Default)]
pub struct Snapshot {
    entries: Vec<ChainEntry>,
    by_name: FxHashMap<String, usize>,
    /// First occurrence of each asset identity. Duplicate base denoms
    /// stay visible in the owning chain's asset list.
    asset_index: FxHashMap<AssetId, (usize, usize)>,
    connections: FxHashMap<(NetworkType, String, String), ConnectionRecord>,
}

impl Snapshot {
    /// Load every chain record in parallel, then index.
    pub fn load(store: &RegistryStore) -> Result<Self, StoreError> {
        let dirs = store.list_chain_dirs()?;
        let entries = dirs
            .into_par_iter()
            .map(|dir| {
                let record = store.read_chain(&dir)?;
                let assets = store.read_asset_list(&dir)?;
                Ok(ChainEntry { dir, record, assets })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let mut connections = Vec::new();
        for &network in NETWORK_ROOTS {
            for record in store.list_connections(network)? {
                connections.push((network, record));
            }
        }

        Ok(Self::from_entries(entries).with_connections(connections))
    }

    /// Build a snapshot from already-loaded entries. Used by tests and
    /// by sync utilities that assemble partial views.
    pub fn from_entries(entries: Vec<ChainEntry>) -> Self {
        let mut by_name = FxHashMap::default();
        let mut asset_index = FxHashMap::default();
        for (ci, entry) in entries.iter().enumerate() {
            by_name.entry(entry.dir.name.clone()).or_insert(ci);
            for (ai, asset) in entry.asset_list().iter().enumerate() {
                let id = AssetId::new(entry.dir.name.clone(), asset.base.clone());
                asset_index.entry(id).or_insert((ci, ai));
            }
        }
        Self {
            entries,
            by_name,
            asset_index,
            connections: FxHashMap::default(),
        }
    }

    pub fn with_connections(
        mut self,
        connections: Vec<(NetworkType, ConnectionRecord)>,
    ) -> Self {
        for (network, record) in connections {
            let a = record.chain_1.chain_name.clone();
            let b = record.chain_2.chain_name.clone();
            let key = if a <= b { (network, a, b) } else { (network, b, a) };
            self.connections.insert(key, record);
        }
        self
    }

    pub fn chains(&self) -> impl Iterator<Item = &ChainEntry> {
        self.entries.iter()
    }

    pub fn chain(&self, name: &str) -> Option<&ChainEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub fn asset(&self, id: &AssetId) -> Option<&Asset> {
        self.asset_index
            .get(id)
            .map(|&(ci, ai)| &self.entries[ci].asset_list()[ai])
    }

    /// Network-type root the chain lives under, from its location.
    pub fn network_type(&self, chain_name: &str) -> Option<NetworkType> {
        self.chain(chain_name).map(|e| e.dir.network_type)
    }

    /// All asset identities in chain order, including only the first
    /// occurrence of a duplicated base denom.
    pub fn asset_ids(&self) -> impl Iterator<Item = (AssetId, &Asset)> {
        self.entries.iter().flat_map(|entry| {
            entry.asset_list().iter().map(move |asset| {
                (
                    AssetId::new(entry.dir.name.clone(), asset.base.clone()),
                    asset,
                )
            })
        })
    }

    /// Decimals of an asset: the exponent of the denom unit matching its
    /// display denom, by name or alias.
    pub fn asset_decimals(&self, id: &AssetId) -> Option<u32> {
        let asset = self.asset(id)?;
        let display = asset.display.as_deref()?;
        asset
            .denom_units
            .iter()
            .find(|u| u.denom == display || u.aliases.iter().any(|a| a == display))
            .map(|u| u.exponent)
    }

    /// The bilateral connection record for two chains, keyed by sorted
    /// pair under the given network root.
    pub fn connection(
        &self,
        network: NetworkType,
        a: &str,
        b: &str,
    ) -> Option<&ConnectionRecord> {
        let key = if a <= b {
            (network, a.to_string(), b.to_string())
        } else {
            (network, b.to_string(), a.to_string())
        };
        self.connections.get(&key)
    }
}

//! Keyed read/write access to registry records.
//!
//! One JSON document per `(entity, kind)`. Reads are used by the run
//! snapshot; writes exist only for the sync utilities, which mutate one
//! record at a time.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracelint_core::errors::StoreError;
use tracelint_core::types::NetworkType;

use crate::layout::{
    self, ChainDir, RecordKind, CONNECTION_DIR, NETWORK_ROOTS, NON_CHAIN_DIRECTORIES,
    NON_COSMOS_DIR,
};
use crate::records::{AssetListRecord, ChainRecord, ConnectionRecord, VersionsRecord};

/// Read/write access to a registry tree on disk.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    root: PathBuf,
}

impl RegistryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerate every chain directory in the tree, sorted by name for a
    /// deterministic run order.
    pub fn list_chain_dirs(&self) -> Result<Vec<ChainDir>, StoreError> {
        let mut dirs = Vec::new();
        for &network in NETWORK_ROOTS {
            let network_root = layout::network_root(&self.root, network);
            if !network_root.is_dir() {
                continue;
            }
            self.collect_chain_dirs(&network_root, network, true, &mut dirs)?;
            let non_cosmos = network_root.join(NON_COSMOS_DIR);
            if non_cosmos.is_dir() {
                self.collect_chain_dirs(&non_cosmos, network, false, &mut dirs)?;
            }
        }
        dirs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(dirs)
    }

    fn collect_chain_dirs(
        &self,
        parent: &Path,
        network: NetworkType,
        cosmos: bool,
        out: &mut Vec<ChainDir>,
    ) -> Result<(), StoreError> {
        let entries = fs::read_dir(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || NON_CHAIN_DIRECTORIES.contains(&name.as_str()) {
                continue;
            }
            // A chain directory is recognized by its chain record.
            if !path.join(RecordKind::Chain.file_name()).is_file() {
                continue;
            }
            out.push(ChainDir {
                name,
                network_type: network,
                cosmos,
                path,
            });
        }
        Ok(())
    }

    pub fn read_chain(&self, dir: &ChainDir) -> Result<ChainRecord, StoreError> {
        self.read_json(&dir.record_path(RecordKind::Chain))
    }

    pub fn read_asset_list(&self, dir: &ChainDir) -> Result<Option<AssetListRecord>, StoreError> {
        self.read_optional(&dir.record_path(RecordKind::AssetList))
    }

    pub fn read_versions(&self, dir: &ChainDir) -> Result<Option<VersionsRecord>, StoreError> {
        self.read_optional(&dir.record_path(RecordKind::Versions))
    }

    pub fn write_chain(&self, dir: &ChainDir, record: &ChainRecord) -> Result<(), StoreError> {
        self.write_json(&dir.record_path(RecordKind::Chain), record)
    }

    pub fn write_asset_list(
        &self,
        dir: &ChainDir,
        record: &AssetListRecord,
    ) -> Result<(), StoreError> {
        self.write_json(&dir.record_path(RecordKind::AssetList), record)
    }

    pub fn write_versions(&self, dir: &ChainDir, record: &VersionsRecord) -> Result<(), StoreError> {
        self.write_json(&dir.record_path(RecordKind::Versions), record)
    }

    /// Read the bilateral connection record for two chains under the
    /// given network root, if one is registered.
    pub fn read_connection(
        &self,
        network: NetworkType,
        a: &str,
        b: &str,
    ) -> Result<Option<ConnectionRecord>, StoreError> {
        self.read_optional(&layout::connection_path(&self.root, network, a, b))
    }

    /// All connection records under a network root.
    pub fn list_connections(
        &self,
        network: NetworkType,
    ) -> Result<Vec<ConnectionRecord>, StoreError> {
        let dir = layout::network_root(&self.root, network).join(CONNECTION_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        paths.iter().map(|p| self.read_json(p)).collect()
    }

    fn read_optional<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, StoreError> {
        if !path.is_file() {
            return Ok(None);
        }
        self.read_json(path).map(Some)
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, StoreError> {
        let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        let mut text = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        text.push('\n');
        fs::write(path, text).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

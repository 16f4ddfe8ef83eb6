//! On-disk layout of the registry tree.
//!
//! Mainnet chains live directly under the registry root, testnets under
//! `testnets/`, devnets under `devnets/`. Non-cosmos chains sit in a
//! `_non-cosmos` subdirectory of their network root, and each network
//! root shares one `_IBC` directory of bilateral connection records.

use std::path::{Path, PathBuf};

use tracelint_core::types::NetworkType;

/// Directory of bilateral connection records, shared per network root.
pub const CONNECTION_DIR: &str = "_IBC";

/// Subdirectory of a network root holding non-cosmos chains.
pub const NON_COSMOS_DIR: &str = "_non-cosmos";

/// Directory names under a network root that are not chain directories.
pub const NON_CHAIN_DIRECTORIES: &[&str] = &[
    ".git",
    ".github",
    ".vs",
    "_IBC",
    "_memo_keys",
    "_non-cosmos",
    "_template",
    "_scripts",
    "testnets",
    "devnets",
    "node_modules",
];

/// Network types that have a directory of their own in the tree.
pub const NETWORK_ROOTS: &[NetworkType] = &[
    NetworkType::Mainnet,
    NetworkType::Testnet,
    NetworkType::Devnet,
];

/// The kinds of record document a chain directory can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Chain,
    AssetList,
    Versions,
}

impl RecordKind {
    pub fn file_name(self) -> &'static str {
        match self {
            RecordKind::Chain => "chain.json",
            RecordKind::AssetList => "assetlist.json",
            RecordKind::Versions => "versions.json",
        }
    }

    pub fn schema_file_name(self) -> &'static str {
        match self {
            RecordKind::Chain => "chain.schema.json",
            RecordKind::AssetList => "assetlist.schema.json",
            RecordKind::Versions => "versions.schema.json",
        }
    }
}

/// Location of one chain's directory within the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDir {
    pub name: String,
    pub network_type: NetworkType,
    pub cosmos: bool,
    pub path: PathBuf,
}

impl ChainDir {
    pub fn record_path(&self, kind: RecordKind) -> PathBuf {
        self.path.join(kind.file_name())
    }

    /// Expected relative `$schema` reference for a record in this
    /// directory: one `../` per level of nesting below the registry
    /// root, where the schema files live.
    pub fn expected_schema_reference(&self, kind: RecordKind) -> String {
        let mut depth = 1;
        if self.network_type != NetworkType::Mainnet {
            depth += 1;
        }
        if !self.cosmos {
            depth += 1;
        }
        format!("{}{}", "../".repeat(depth), kind.schema_file_name())
    }
}

/// Directory a network type's chains live under.
pub fn network_root(registry_root: &Path, network: NetworkType) -> PathBuf {
    match network {
        NetworkType::Mainnet => registry_root.to_path_buf(),
        NetworkType::Testnet => registry_root.join("testnets"),
        NetworkType::Devnet => registry_root.join("devnets"),
    }
}

/// The connection record for two chains is keyed by their names sorted
/// lexicographically.
pub fn connection_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub fn connection_file_name(a: &str, b: &str) -> String {
    let (first, second) = connection_pair(a, b);
    format!("{first}-{second}.json")
}

pub fn connection_path(registry_root: &Path, network: NetworkType, a: &str, b: &str) -> PathBuf {
    network_root(registry_root, network)
        .join(CONNECTION_DIR)
        .join(connection_file_name(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_file_name_sorts_pair() {
        assert_eq!(connection_file_name("osmosis", "axelar"), "axelar-osmosis.json");
        assert_eq!(connection_file_name("axelar", "osmosis"), "axelar-osmosis.json");
    }

    fn dir(network: NetworkType, cosmos: bool) -> ChainDir {
        ChainDir {
            name: "x".into(),
            network_type: network,
            cosmos,
            path: PathBuf::from("/tmp/x"),
        }
    }

    #[test]
    fn schema_reference_depth() {
        assert_eq!(
            dir(NetworkType::Mainnet, true).expected_schema_reference(RecordKind::Chain),
            "../chain.schema.json"
        );
        assert_eq!(
            dir(NetworkType::Testnet, true).expected_schema_reference(RecordKind::Chain),
            "../../chain.schema.json"
        );
        assert_eq!(
            dir(NetworkType::Mainnet, false).expected_schema_reference(RecordKind::AssetList),
            "../../assetlist.schema.json"
        );
        assert_eq!(
            dir(NetworkType::Testnet, false).expected_schema_reference(RecordKind::Chain),
            "../../../chain.schema.json"
        );
    }

    #[test]
    fn network_roots_nest_under_registry_root() {
        let root = Path::new("/registry");
        assert_eq!(network_root(root, NetworkType::Mainnet), root);
        assert_eq!(network_root(root, NetworkType::Testnet), root.join("testnets"));
        assert_eq!(network_root(root, NetworkType::Devnet), root.join("devnets"));
    }
}

//! On-disk registry fixtures for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tempfile::TempDir;
use tracelint_registry::RegistryStore;

pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        tracelint_core::logging::init();
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    pub fn store(&self) -> RegistryStore {
        RegistryStore::new(self.dir.path())
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a chain record; the directory name comes from `chain_name`.
    pub fn add_chain(&self, chain: Value) -> &Self {
        let name = chain["chain_name"].as_str().expect("chain_name");
        self.write(&format!("{name}/chain.json"), &chain);
        self
    }

    /// Write an asset list for an already-added chain.
    pub fn add_assets(&self, chain_name: &str, assets: Vec<Value>) -> &Self {
        let list = json!({
            "$schema": "../assetlist.schema.json",
            "chain_name": chain_name,
            "assets": assets,
        });
        self.write(&format!("{chain_name}/assetlist.json"), &list);
        self
    }

    /// Write a connection record under `_IBC`, named by sorted pair.
    pub fn add_connection(&self, a: &str, b: &str, channels: Vec<Value>) -> &Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let record = json!({
            "chain_1": {"chain_name": first},
            "chain_2": {"chain_name": second},
            "channels": channels,
        });
        self.write(&format!("_IBC/{first}-{second}.json"), &record);
        self
    }

    fn write(&self, rel: &str, value: &Value) {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, serde_json::to_string_pretty(value).expect("json")).expect("write");
    }
}

/// A minimal valid mainnet cosmos chain record.
pub fn chain(name: &str) -> Value {
    json!({
        "$schema": "../chain.schema.json",
        "chain_name": name,
        "chain_id": format!("{name}-1"),
        "chain_type": "cosmos",
        "network_type": "mainnet",
        "status": "live",
        "bech32_prefix": name,
        "slip44": 118,
    })
}

/// A native asset with sane display units.
pub fn native_asset(base: &str, symbol: &str) -> Value {
    let display = symbol.to_lowercase();
    json!({
        "base": base,
        "name": symbol,
        "display": display,
        "symbol": symbol,
        "denom_units": [
            {"denom": base, "exponent": 0},
            {"denom": display, "exponent": 6},
        ],
    })
}

/// The uppercase SHA-256 a transfer path folds to.
pub fn ibc_hash(path: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(path.as_bytes());
    digest.iter().map(|b| format!("{b:02X}")).collect()
}

/// A transfer/transfer channel, `chain_1` side first.
pub fn transfer_channel(chain_1_channel: &str, chain_2_channel: &str) -> Value {
    json!({
        "chain_1": {"channel_id": chain_1_channel, "port_id": "transfer"},
        "chain_2": {"channel_id": chain_2_channel, "port_id": "transfer"},
        "ordering": "unordered",
        "version": "ics20-1",
        "tags": {"status": "live"},
    })
}

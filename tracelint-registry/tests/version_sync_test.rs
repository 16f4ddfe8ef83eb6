//! Version sync against an on-disk registry fixture.

use std::fs;
use std::path::Path;

use tracelint_registry::sync::{sync_versions, SyncStats};
use tracelint_registry::RegistryStore;

fn write(path: &Path, value: &serde_json::Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn chain_with_codebase() -> serde_json::Value {
    serde_json::json!({
        "chain_name": "gaia",
        "chain_type": "cosmos",
        "network_type": "mainnet",
        "codebase": {
            "git_repo": "https://github.com/example/gaia",
            "recommended_version": "v15.1.0",
            "compatible_versions": ["v15.0.0"],
            "sdk": {"type": "cosmos", "version": "0.47"}
        }
    })
}

#[test]
fn first_run_writes_second_run_is_a_noop() {
    let tmp = tempfile::tempdir().unwrap();
    write(&tmp.path().join("gaia/chain.json"), &chain_with_codebase());
    let store = RegistryStore::new(tmp.path());

    let first = sync_versions(&store, None).unwrap();
    // chain.json gains the recommended version in compatible_versions,
    // versions.json is created with the current entry.
    assert!(first.writes >= 2);

    let second = sync_versions(&store, None).unwrap();
    assert_eq!(second, SyncStats { writes: 0 });
}

#[test]
fn recommended_version_is_added_to_compatible_versions() {
    let tmp = tempfile::tempdir().unwrap();
    write(&tmp.path().join("gaia/chain.json"), &chain_with_codebase());
    let store = RegistryStore::new(tmp.path());
    sync_versions(&store, None).unwrap();

    let dirs = store.list_chain_dirs().unwrap();
    let chain = store.read_chain(&dirs[0]).unwrap();
    let compat = &chain.codebase.unwrap().version.compatible_versions;
    assert!(compat.contains(&"v15.1.0".to_string()));
    assert!(compat.contains(&"v15.0.0".to_string()));
}

#[test]
fn history_entry_matches_by_shared_compatible_version() {
    let tmp = tempfile::tempdir().unwrap();
    write(&tmp.path().join("gaia/chain.json"), &chain_with_codebase());
    write(
        &tmp.path().join("gaia/versions.json"),
        &serde_json::json!({
            "chain_name": "gaia",
            "versions": [{
                "name": "v15",
                "recommended_version": "v15.0.0",
                "compatible_versions": ["v15.0.0"],
                "cosmwasm": {"enabled": false}
            }]
        }),
    );
    let store = RegistryStore::new(tmp.path());
    sync_versions(&store, None).unwrap();

    let dirs = store.list_chain_dirs().unwrap();
    let versions = store.read_versions(&dirs[0]).unwrap().unwrap();
    // Matched the existing compatible entry instead of creating a new one.
    assert_eq!(versions.versions.len(), 1);
    let entry = &versions.versions[0];
    assert_eq!(entry.version.recommended_version.as_deref(), Some("v15.1.0"));

    // The history-only field flowed back into chain.json.
    let chain = store.read_chain(&dirs[0]).unwrap();
    assert!(chain.codebase.unwrap().version.cosmwasm.is_some());
}

#[test]
fn non_cosmos_chains_are_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        &tmp.path().join("_non-cosmos/ethereum/chain.json"),
        &serde_json::json!({
            "chain_name": "ethereum",
            "chain_type": "eip155",
            "codebase": {"recommended_version": "v1.0.0"}
        }),
    );
    let store = RegistryStore::new(tmp.path());
    let stats = sync_versions(&store, None).unwrap();
    assert_eq!(stats.writes, 0);
}

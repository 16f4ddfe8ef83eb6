//! Version synchronization between `chain.json` and `versions.json`.
//!
//! The chain record's `codebase` block is the source of truth; the
//! versions record is the (optional) history. Data flows both ways: the
//! current version's fields are recorded into the matching history
//! entry, and fields only present in the history are pulled back into
//! the chain record.

use serde_json::Map;
use tracelint_core::errors::SyncError;

use crate::layout::RecordKind;
use crate::records::{VersionEntry, VersionFields, VersionsRecord};
use crate::store::RegistryStore;
use crate::sync::SyncStats;

/// Synchronize version data for every cosmos chain, or for a single
/// chain when `chain_filter` is given.
pub fn sync_versions(
    store: &RegistryStore,
    chain_filter: Option<&str>,
) -> Result<SyncStats, SyncError> {
    let mut stats = SyncStats::default();

    for dir in store.list_chain_dirs()? {
        if chain_filter.is_some_and(|f| f != dir.name) {
            continue;
        }
        let mut chain = store.read_chain(&dir)?;
        if !chain.is_cosmos() {
            continue;
        }
        let Some(codebase) = chain.codebase.as_mut() else {
            continue;
        };
        if codebase.version.is_empty() {
            continue;
        }

        let mut chain_changed = false;
        if let Some(recommended) = codebase.version.recommended_version.clone() {
            if !codebase.version.compatible_versions.contains(&recommended) {
                codebase.version.compatible_versions.push(recommended);
                codebase.version.compatible_versions.sort();
                chain_changed = true;
            }
        }

        let existing = store.read_versions(&dir)?;
        let mut versions = existing.clone().unwrap_or_else(|| VersionsRecord {
            schema: Some(dir.expected_schema_reference(RecordKind::Versions)),
            chain_name: dir.name.clone(),
            versions: Vec::new(),
            extra: Map::new(),
        });

        let mut versions_changed = existing.is_none();
        match versions
            .versions
            .iter_mut()
            .find(|e| e.version.is_compatible_with(&codebase.version))
        {
            Some(entry) => {
                if record_current(&mut entry.version, &codebase.version) {
                    versions_changed = true;
                }
                if pull_back(&mut codebase.version, &entry.version) {
                    chain_changed = true;
                }
            }
            None => {
                versions.versions.push(VersionEntry {
                    name: codebase.version.recommended_version.clone(),
                    version: codebase.version.clone(),
                    extra: Map::new(),
                });
                versions_changed = true;
            }
        }

        if versions_changed {
            store.write_versions(&dir, &versions)?;
            stats.writes += 1;
            tracing::debug!(chain = %dir.name, "versions record updated");
        }
        if chain_changed {
            store.write_chain(&dir, &chain)?;
            stats.writes += 1;
            tracing::debug!(chain = %dir.name, "chain codebase updated");
        }
    }

    Ok(stats)
}

/// Record the chain's current version fields into the history entry.
/// The chain side wins any disagreement.
fn record_current(entry: &mut VersionFields, current: &VersionFields) -> bool {
    let mut changed = false;
    if current.recommended_version.is_some() && entry.recommended_version != current.recommended_version {
        entry.recommended_version = current.recommended_version.clone();
        changed = true;
    }
    for v in &current.compatible_versions {
        if !entry.compatible_versions.contains(v) {
            entry.compatible_versions.push(v.clone());
            entry.compatible_versions.sort();
            changed = true;
        }
    }
    macro_rules! copy_field {
        ($field:ident) => {
            if current.$field.is_some() && entry.$field != current.$field {
                entry.$field = current.$field.clone();
                changed = true;
            }
        };
    }
    copy_field!(tag);
    copy_field!(language);
    copy_field!(binaries);
    copy_field!(sdk);
    copy_field!(consensus);
    copy_field!(cosmwasm);
    copy_field!(ibc);
    changed
}

/// Pull fields recorded in the history but missing from the chain record
/// back into the chain record.
fn pull_back(current: &mut VersionFields, entry: &VersionFields) -> bool {
    let mut changed = false;
    macro_rules! fill_field {
        ($field:ident) => {
            if current.$field.is_none() && entry.$field.is_some() {
                current.$field = entry.$field.clone();
                changed = true;
            }
        };
    }
    fill_field!(tag);
    fill_field!(language);
    fill_field!(binaries);
    fill_field!(sdk);
    fill_field!(consensus);
    fill_field!(cosmwasm);
    fill_field!(ibc);
    changed
}

//! Price-identifier grouping.
//!
//! Assets sharing one external price identifier must share one
//! provenance origin under the price-identity edge filter. The group's
//! origin is the unique mainnet origin among its members; groups with no
//! mainnet member are allowed and fall back to an arbitrary resolved
//! origin.

pub mod catalog;

pub use catalog::{Catalog, CatalogEntry, CatalogSource, HttpCatalogSource, StaticCatalogSource};

use tracelint_core::types::collections::FxHashMap;
use tracelint_core::types::{AssetId, NetworkType};
use tracelint_registry::Snapshot;

use crate::provenance::{TraceGraph, PRICE_IDENTITY_TYPES};

/// The derived group for one external price identifier.
#[derive(Debug, Clone, Default)]
pub struct IdentifierGroup {
    pub members: Vec<AssetId>,
    /// Distinct mainnet origins among the members' resolved origins.
    /// More than one makes the group ambiguous.
    pub mainnet_origins: Vec<AssetId>,
    /// The group origin every member must resolve to: the unique
    /// mainnet origin, or any resolved origin for mainnet-free groups.
    pub origin: Option<AssetId>,
}

/// Scan every asset's external identifier and resolve each member's
/// origin once. Members whose resolution fails structurally are left
/// out here; the trace validity check owns that failure.
pub fn build_groups(snapshot: &Snapshot, graph: &TraceGraph) -> FxHashMap<String, IdentifierGroup> {
    let mut groups: FxHashMap<String, IdentifierGroup> = FxHashMap::default();

    for (id, asset) in snapshot.asset_ids() {
        let Some(identifier) = asset.coingecko_id.as_deref().filter(|s| !s.is_empty()) else {
            continue;
        };
        let group = groups.entry(identifier.to_string()).or_default();
        group.members.push(id.clone());

        let Ok(origin) = graph.resolve_origin(&id, PRICE_IDENTITY_TYPES) else {
            continue;
        };
        let origin_is_mainnet =
            snapshot.network_type(&origin.chain_name) == Some(NetworkType::Mainnet);
        if origin_is_mainnet {
            if !group.mainnet_origins.contains(&origin) {
                group.mainnet_origins.push(origin.clone());
            }
            // The unique mainnet origin wins over any fallback.
            if group.mainnet_origins.len() == 1 {
                group.origin = Some(origin);
            }
        } else if group.origin.is_none() {
            group.origin = Some(origin);
        }
    }

    groups
}

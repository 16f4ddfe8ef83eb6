//! The trace graph: an adjacency view over every asset's active trace,
//! built once per run from the snapshot.
//!
//! Each asset contributes at most one outgoing edge, for the last
//! element of its `traces[]`. Counterparties that are not registered
//! still get a node so a dangling pointer can be named in the error.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracelint_core::errors::ResolveError;
use tracelint_core::types::collections::{FxHashMap, FxHashSet};
use tracelint_core::types::{AssetId, TraceType};
use tracelint_registry::records::{Asset, Trace};
use tracelint_registry::Snapshot;

pub struct TraceGraph {
    graph: DiGraph<AssetId, TraceType>,
    index: FxHashMap<AssetId, NodeIndex>,
    /// Nodes backed by a registered asset; the rest are dangling
    /// counterparties.
    registered: FxHashSet<NodeIndex>,
}

impl TraceGraph {
    pub fn build(snapshot: &Snapshot) -> Self {
        let mut graph = DiGraph::new();
        let mut index: FxHashMap<AssetId, NodeIndex> = FxHashMap::default();
        let mut registered = FxHashSet::default();

        for (id, _) in snapshot.asset_ids() {
            let node = *index
                .entry(id.clone())
                .or_insert_with(|| graph.add_node(id));
            registered.insert(node);
        }

        for (id, asset) in snapshot.asset_ids() {
            let Some(trace) = asset.last_trace() else {
                continue;
            };
            // A trace type outside the vocabulary is never traversable;
            // the trace validity check reports it.
            let Some(kind) = trace.kind() else {
                continue;
            };
            let from = index[&id];
            // A duplicated base denom would contribute a second edge;
            // only the first occurrence counts, matching the snapshot's
            // asset index.
            if graph.edges(from).next().is_some() {
                continue;
            }
            let counterparty = AssetId::new(
                trace.counterparty.chain_name.clone(),
                trace.counterparty.base_denom.clone(),
            );
            let to = *index
                .entry(counterparty.clone())
                .or_insert_with(|| graph.add_node(counterparty));
            graph.add_edge(from, to, kind);
        }

        Self {
            graph,
            index,
            registered,
        }
    }

    /// Walk traces back while the active trace's type is in `allowed`.
    /// The first asset whose active trace is absent or excluded is the
    /// origin.
    pub fn resolve_origin(
        &self,
        id: &AssetId,
        allowed: &[TraceType],
    ) -> Result<AssetId, ResolveError> {
        let mut node = self.registered_node(id)?;
        let mut visited = FxHashSet::default();
        visited.insert(node);

        loop {
            let Some(edge) = self.graph.edges(node).next() else {
                return Ok(self.graph[node].clone());
            };
            if !allowed.contains(edge.weight()) {
                return Ok(self.graph[node].clone());
            }
            let target = edge.target();
            if target == node {
                return Err(ResolveError::SelfReference(self.graph[node].clone()));
            }
            if !self.registered.contains(&target) {
                return Err(ResolveError::MissingCounterparty {
                    from: self.graph[node].clone(),
                    to: self.graph[target].clone(),
                });
            }
            if !visited.insert(target) {
                return Err(ResolveError::Cycle {
                    start: id.clone(),
                    repeated: self.graph[target].clone(),
                });
            }
            node = target;
        }
    }

    /// Same walk as [`resolve_origin`], but stop at the first hop where
    /// `getter` yields a value: a derived asset's own field overrides
    /// anything inherited from further back.
    ///
    /// Getters should treat empty values as absent.
    ///
    /// [`resolve_origin`]: TraceGraph::resolve_origin
    pub fn resolve_field<'s, T>(
        &self,
        snapshot: &'s Snapshot,
        id: &AssetId,
        allowed: &[TraceType],
        getter: impl Fn(&'s Asset) -> Option<T>,
    ) -> Result<Option<T>, ResolveError> {
        let mut node = self.registered_node(id)?;
        let mut visited = FxHashSet::default();
        visited.insert(node);

        loop {
            let current = &self.graph[node];
            let asset = snapshot
                .asset(current)
                .ok_or_else(|| ResolveError::UnknownAsset(current.clone()))?;
            if let Some(value) = getter(asset) {
                return Ok(Some(value));
            }
            let Some(edge) = self.graph.edges(node).next() else {
                return Ok(None);
            };
            if !allowed.contains(edge.weight()) {
                return Ok(None);
            }
            let target = edge.target();
            if target == node {
                return Err(ResolveError::SelfReference(current.clone()));
            }
            if !self.registered.contains(&target) {
                return Err(ResolveError::MissingCounterparty {
                    from: current.clone(),
                    to: self.graph[target].clone(),
                });
            }
            if !visited.insert(target) {
                return Err(ResolveError::Cycle {
                    start: id.clone(),
                    repeated: self.graph[target].clone(),
                });
            }
            node = target;
        }
    }

    fn registered_node(&self, id: &AssetId) -> Result<NodeIndex, ResolveError> {
        match self.index.get(id) {
            Some(&node) if self.registered.contains(&node) => Ok(node),
            _ => Err(ResolveError::UnknownAsset(id.clone())),
        }
    }
}

/// The full provenance path of an asset, oldest hop first: each asset's
/// active trace, concatenated walking back toward origin. The walk stops
/// silently at an unregistered counterparty; dangling pointers are the
/// trace validity check's problem.
pub fn trace_path(snapshot: &Snapshot, id: &AssetId) -> Result<Vec<Trace>, ResolveError> {
    if snapshot.asset(id).is_none() {
        return Err(ResolveError::UnknownAsset(id.clone()));
    }
    let mut hops = Vec::new();
    let mut visited = FxHashSet::default();
    let mut current = id.clone();
    visited.insert(current.clone());

    while let Some(asset) = snapshot.asset(&current) {
        let Some(trace) = asset.last_trace() else {
            break;
        };
        hops.push(trace.clone());
        let next = AssetId::new(
            trace.counterparty.chain_name.clone(),
            trace.counterparty.base_denom.clone(),
        );
        if next == current {
            return Err(ResolveError::SelfReference(current));
        }
        if !visited.insert(next.clone()) {
            return Err(ResolveError::Cycle {
                start: id.clone(),
                repeated: next,
            });
        }
        current = next;
    }
    hops.reverse();
    Ok(hops)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tracelint_core::types::NetworkType;
    use tracelint_registry::layout::ChainDir;
    use tracelint_registry::records::{AssetListRecord, ChainRecord, Trace, TraceCounterparty};
    use tracelint_registry::ChainEntry;

    use super::*;
    use crate::provenance::{PRICE_IDENTITY_TYPES, TRANSFER_TYPES};

    fn chain(name: &str, assets: Vec<Asset>) -> ChainEntry {
        ChainEntry {
            dir: ChainDir {
                name: name.to_string(),
                network_type: NetworkType::Mainnet,
                cosmos: true,
                path: PathBuf::from(name),
            },
            record: ChainRecord {
                chain_name: name.to_string(),
                ..Default::default()
            },
            assets: Some(AssetListRecord {
                chain_name: name.to_string(),
                assets,
                ..Default::default()
            }),
        }
    }

    fn asset(base: &str, traces: Vec<Trace>) -> Asset {
        Asset {
            base: base.to_string(),
            traces,
            ..Default::default()
        }
    }

    fn trace(trace_type: TraceType, chain_name: &str, base_denom: &str) -> Trace {
        Trace {
            trace_type: trace_type.as_str().to_string(),
            counterparty: TraceCounterparty {
                chain_name: chain_name.to_string(),
                base_denom: base_denom.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn asset_without_traces_is_its_own_origin() {
        let snapshot = Snapshot::from_entries(vec![chain("cosmoshub", vec![asset("uatom", vec![])])]);
        let graph = TraceGraph::build(&snapshot);
        let id = AssetId::new("cosmoshub", "uatom");
        assert_eq!(graph.resolve_origin(&id, TRANSFER_TYPES).unwrap(), id);
    }

    #[test]
    fn excluded_edge_type_stops_the_walk() {
        let snapshot = Snapshot::from_entries(vec![
            chain("cosmoshub", vec![asset("uatom", vec![])]),
            chain(
                "stride",
                vec![asset(
                    "stuatom",
                    vec![trace(TraceType::LiquidStake, "cosmoshub", "uatom")],
                )],
            ),
        ]);
        let graph = TraceGraph::build(&snapshot);
        let staked = AssetId::new("stride", "stuatom");
        // A liquid-stake hop is not a price-identity edge: the
        // derivative keeps its own identity.
        assert_eq!(
            graph.resolve_origin(&staked, PRICE_IDENTITY_TYPES).unwrap(),
            staked
        );
    }

    #[test]
    fn transfer_chain_resolves_to_ultimate_origin() {
        let snapshot = Snapshot::from_entries(vec![
            chain("cosmoshub", vec![asset("uatom", vec![])]),
            chain(
                "osmosis",
                vec![asset("ibc/ATOMHASH", vec![trace(TraceType::Ibc, "cosmoshub", "uatom")])],
            ),
            chain(
                "juno",
                vec![asset(
                    "ibc/ATOMVIAOSMO",
                    vec![trace(TraceType::Ibc, "osmosis", "ibc/ATOMHASH")],
                )],
            ),
        ]);
        let graph = TraceGraph::build(&snapshot);
        assert_eq!(
            graph
                .resolve_origin(&AssetId::new("juno", "ibc/ATOMVIAOSMO"), TRANSFER_TYPES)
                .unwrap(),
            AssetId::new("cosmoshub", "uatom")
        );
    }

    #[test]
    fn self_reference_is_rejected_for_any_edge_type() {
        for trace_type in [TraceType::Ibc, TraceType::Wrapped, TraceType::Bridge] {
            let snapshot = Snapshot::from_entries(vec![chain(
                "osmosis",
                vec![asset("uloop", vec![trace(trace_type, "osmosis", "uloop")])],
            )]);
            let graph = TraceGraph::build(&snapshot);
            let result = graph.resolve_origin(
                &AssetId::new("osmosis", "uloop"),
                &[trace_type],
            );
            assert!(matches!(result, Err(ResolveError::SelfReference(_))));
        }
    }

    #[test]
    fn cross_asset_cycle_is_detected() {
        let snapshot = Snapshot::from_entries(vec![
            chain("a", vec![asset("ua", vec![trace(TraceType::Ibc, "b", "ub")])]),
            chain("b", vec![asset("ub", vec![trace(TraceType::Ibc, "a", "ua")])]),
        ]);
        let graph = TraceGraph::build(&snapshot);
        let result = graph.resolve_origin(&AssetId::new("a", "ua"), TRANSFER_TYPES);
        assert!(matches!(result, Err(ResolveError::Cycle { .. })));
    }

    #[test]
    fn dangling_counterparty_is_reported() {
        let snapshot = Snapshot::from_entries(vec![chain(
            "osmosis",
            vec![asset("ibc/GONE", vec![trace(TraceType::Ibc, "ghostchain", "ughost")])],
        )]);
        let graph = TraceGraph::build(&snapshot);
        let result = graph.resolve_origin(&AssetId::new("osmosis", "ibc/GONE"), TRANSFER_TYPES);
        match result {
            Err(ResolveError::MissingCounterparty { to, .. }) => {
                assert_eq!(to, AssetId::new("ghostchain", "ughost"));
            }
            other => panic!("expected MissingCounterparty, got {other:?}"),
        }
    }

    #[test]
    fn resolve_field_prefers_local_override() {
        let mut origin = asset("uatom", vec![]);
        origin.display = Some("atom".into());
        let mut derived = asset("ibc/ATOM", vec![trace(TraceType::Ibc, "cosmoshub", "uatom")]);
        derived.display = Some("atom-on-osmosis".into());
        let mut bare = asset("ibc/ATOM2", vec![trace(TraceType::Ibc, "cosmoshub", "uatom")]);
        bare.display = None;

        let snapshot = Snapshot::from_entries(vec![
            chain("cosmoshub", vec![origin]),
            chain("osmosis", vec![derived, bare]),
        ]);
        let graph = TraceGraph::build(&snapshot);

        let local = graph
            .resolve_field(
                &snapshot,
                &AssetId::new("osmosis", "ibc/ATOM"),
                TRANSFER_TYPES,
                |a| a.display.clone(),
            )
            .unwrap();
        assert_eq!(local.as_deref(), Some("atom-on-osmosis"));

        let inherited = graph
            .resolve_field(
                &snapshot,
                &AssetId::new("osmosis", "ibc/ATOM2"),
                TRANSFER_TYPES,
                |a| a.display.clone(),
            )
            .unwrap();
        assert_eq!(inherited.as_deref(), Some("atom"));
    }

    #[test]
    fn trace_path_is_ordered_oldest_first() {
        let snapshot = Snapshot::from_entries(vec![
            chain("cosmoshub", vec![asset("uatom", vec![])]),
            chain(
                "osmosis",
                vec![asset("ibc/HOP1", vec![trace(TraceType::Ibc, "cosmoshub", "uatom")])],
            ),
            chain(
                "juno",
                vec![asset("ibc/HOP2", vec![trace(TraceType::Ibc, "osmosis", "ibc/HOP1")])],
            ),
        ]);
        let path = trace_path(&snapshot, &AssetId::new("juno", "ibc/HOP2")).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].counterparty.chain_name, "cosmoshub");
        assert_eq!(path[1].counterparty.chain_name, "osmosis");
    }
}

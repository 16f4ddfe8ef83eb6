//! Check execution: topological order, per-entity prerequisite gating,
//! outcome memoization.

use tracelint_core::types::collections::{FxHashMap, FxHashSet};
use tracelint_core::types::AssetId;
use tracelint_registry::Snapshot;

use crate::identifier::{Catalog, IdentifierGroup};
use crate::provenance::TraceGraph;

use super::report::Report;
use super::{asset, chain, CheckId, CheckScope, Identity, Outcome};

/// Shared mutable state for one validation pass: the external catalog
/// (when reachable), the precomputed identifier groups, and the
/// cross-entity accumulators some checks need.
pub struct RunContext<'a> {
    pub catalog: Option<&'a Catalog>,
    pub groups: FxHashMap<String, IdentifierGroup>,
    /// chain_id -> first chain seen using it.
    pub seen_chain_ids: FxHashMap<String, String>,
    /// chain name -> base denoms seen so far in its asset list.
    pub seen_base_denoms: FxHashMap<String, FxHashSet<String>>,
}

impl<'a> RunContext<'a> {
    pub fn new(catalog: Option<&'a Catalog>, groups: FxHashMap<String, IdentifierGroup>) -> Self {
        Self {
            catalog,
            groups,
            seen_chain_ids: FxHashMap::default(),
            seen_base_denoms: FxHashMap::default(),
        }
    }
}

/// Runs the check set over every entity in the snapshot.
pub struct CheckEngine {
    order: Vec<CheckId>,
}

impl Default for CheckEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckEngine {
    pub fn new() -> Self {
        Self {
            order: execution_order(CheckId::ALL),
        }
    }

    /// Run a restricted check set; prerequisites outside the set are
    /// treated as unmet, so dependents of an omitted check stay
    /// inconclusive.
    pub fn with_checks(checks: &[CheckId]) -> Self {
        Self {
            order: execution_order(checks),
        }
    }

    /// Execute every check for every entity, chains in sorted order and
    /// each chain's assets in list order. Nothing aborts early: the
    /// report carries everything found in one pass.
    pub fn run(&self, snapshot: &Snapshot, graph: &TraceGraph, ctx: &mut RunContext) -> Report {
        let mut report = Report::default();
        let mut statuses: FxHashMap<(Identity, CheckId), bool> = FxHashMap::default();

        for entry in snapshot.chains() {
            let identity = Identity::Chain(entry.dir.name.clone());
            for &check in self.order.iter().filter(|c| c.scope() == CheckScope::Chain) {
                self.execute(
                    check,
                    &identity,
                    &mut statuses,
                    &mut report,
                    |ctx| chain::run(check, entry, ctx),
                    ctx,
                );
            }

            for asset in entry.asset_list() {
                let identity =
                    Identity::Asset(AssetId::new(entry.dir.name.clone(), asset.base.clone()));
                for &check in self.order.iter().filter(|c| c.scope() == CheckScope::Asset) {
                    self.execute(
                        check,
                        &identity,
                        &mut statuses,
                        &mut report,
                        |ctx| asset::run(check, snapshot, graph, entry, asset, ctx),
                        ctx,
                    );
                }
            }
        }

        report
    }

    fn execute(
        &self,
        check: CheckId,
        identity: &Identity,
        statuses: &mut FxHashMap<(Identity, CheckId), bool>,
        report: &mut Report,
        run: impl FnOnce(&mut RunContext) -> Outcome,
        ctx: &mut RunContext,
    ) -> Outcome {
        let unmet = check
            .prerequisites()
            .iter()
            .any(|dep| !statuses.get(&(identity.clone(), *dep)).copied().unwrap_or(false));
        let outcome = if unmet {
            tracing::debug!(
                check = check.name(),
                entity = %identity,
                "skipped: prerequisites not met"
            );
            Outcome::Inconclusive
        } else {
            run(ctx)
        };
        statuses.insert((identity.clone(), check), outcome.passed());
        report.record(identity, check, &outcome);
        outcome
    }
}

/// Deterministic topological order: prerequisites first, declaration
/// order as the tie-break. A prerequisite cycle cannot happen with the
/// static check set; if one is ever introduced the remaining checks are
/// appended in declaration order and flagged.
fn execution_order(checks: &[CheckId]) -> Vec<CheckId> {
    let selected: FxHashSet<CheckId> = checks.iter().copied().collect();
    let mut order = Vec::with_capacity(checks.len());
    let mut placed = FxHashSet::default();

    loop {
        let mut progressed = false;
        for &check in CheckId::ALL {
            if !selected.contains(&check) || placed.contains(&check) {
                continue;
            }
            let ready = check
                .prerequisites()
                .iter()
                .all(|dep| !selected.contains(dep) || placed.contains(dep));
            if ready {
                order.push(check);
                placed.insert(check);
                progressed = true;
            }
        }
        if order.len() == selected.len() {
            break;
        }
        if !progressed {
            tracing::error!("check prerequisite cycle; appending remainder in declaration order");
            for &check in CheckId::ALL {
                if selected.contains(&check) && !placed.contains(&check) {
                    order.push(check);
                }
            }
            break;
        }
    }
    order
}

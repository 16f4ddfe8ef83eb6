//! Top-level validation run.

use tracelint_core::config::ValidateConfig;
use tracelint_core::errors::StoreError;
use tracelint_registry::{RegistryStore, Snapshot};

use crate::checks::{CheckEngine, Report, RunContext};
use crate::identifier::{self, Catalog, CatalogSource};
use crate::provenance::TraceGraph;

/// Load a snapshot, build the trace graph, fetch the catalog once, and
/// run the full check set. The returned report carries every failure
/// found; callers turn it terminal with [`Report::into_result`].
///
/// A missing or unreachable catalog source degrades the identifier
/// checks to inconclusive instead of failing the run.
pub fn run_validation(
    store: &RegistryStore,
    config: &ValidateConfig,
    catalog_source: Option<&dyn CatalogSource>,
) -> Result<Report, StoreError> {
    let snapshot = load_snapshot(store, config)?;
    let graph = TraceGraph::build(&snapshot);

    let catalog = fetch_catalog(config, catalog_source);
    let groups = identifier::build_groups(&snapshot, &graph);

    let mut ctx = RunContext::new(catalog.as_ref(), groups);
    let engine = CheckEngine::new();
    let report = engine.run(&snapshot, &graph, &mut ctx);
    tracing::info!(
        checks_run = report.checks_run,
        failures = report.total_failures(),
        inconclusive = report.inconclusive,
        "validation pass complete"
    );
    Ok(report)
}

fn load_snapshot(store: &RegistryStore, config: &ValidateConfig) -> Result<Snapshot, StoreError> {
    if config.snapshot.threads == 0 {
        return Snapshot::load(store);
    }
    match rayon::ThreadPoolBuilder::new()
        .num_threads(config.snapshot.threads)
        .build()
    {
        Ok(pool) => pool.install(|| Snapshot::load(store)),
        Err(error) => {
            tracing::warn!(%error, "could not build snapshot thread pool; using the default");
            Snapshot::load(store)
        }
    }
}

fn fetch_catalog(
    config: &ValidateConfig,
    catalog_source: Option<&dyn CatalogSource>,
) -> Option<Catalog> {
    if config.catalog.offline {
        tracing::info!("offline mode: identifier catalog checks will be inconclusive");
        return None;
    }
    let source = catalog_source?;
    match source.fetch() {
        Ok(entries) => Some(Catalog::new(entries)),
        Err(error) => {
            tracing::warn!(%error, "catalog unavailable; identifier checks will be inconclusive");
            None
        }
    }
}

//! Analysis engine for the interchain token registry.
//!
//! Resolution and validation over a [`tracelint_registry::Snapshot`]:
//! provenance trace walking, bilateral channel cross-validation, price
//! identifier grouping, image reference resolution, and the
//! dependency-gated check engine that ties them together into one
//! aggregate report per run.

pub mod channel;
pub mod checks;
pub mod identifier;
pub mod images;
pub mod provenance;
pub mod runner;

pub use checks::{CheckEngine, Outcome, Report, RunContext, ValidationFailed};
pub use provenance::TraceGraph;
pub use runner::run_validation;

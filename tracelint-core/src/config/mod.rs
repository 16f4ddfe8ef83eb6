//! Engine configuration with layered resolution.

pub mod validate_config;

pub use validate_config::{CatalogSection, SnapshotSection, ValidateConfig};

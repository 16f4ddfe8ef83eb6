//! Core types, errors, logging, and configuration for the Tracelint
//! registry engine.
//!
//! Everything in this crate is shared by the store and analysis layers:
//! entity identity types, the trace edge vocabulary, per-subsystem error
//! enums, and the layered `ValidateConfig`.

pub mod config;
pub mod errors;
pub mod logging;
pub mod types;

pub use config::ValidateConfig;
pub use types::{AssetId, NetworkType, TraceType};

//! Registry store layer: the on-disk layout of the registry tree, typed
//! record documents, keyed read/write access, and the immutable run
//! snapshot the analysis layer works from.
//!
//! The store is deliberately narrow. Validation reads everything through
//! a [`snapshot::Snapshot`] taken once per run; only the sync utilities
//! write, one record at a time.

pub mod layout;
pub mod records;
pub mod snapshot;
pub mod store;
pub mod sync;

pub use layout::{ChainDir, RecordKind};
pub use snapshot::{ChainEntry, Snapshot};
pub use store::RegistryStore;

//! Write-path synchronization utilities.
//!
//! These are the only code paths that mutate the registry. Each one
//! reads a record, rewrites it only when something actually changed, and
//! reports how many documents it wrote so idempotence is observable.

pub mod versions;

pub use versions::sync_versions;

/// Outcome of a sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Number of record documents written.
    pub writes: usize,
}

//! Synchronization utility errors.

use super::store_error::StoreError;

/// Errors from the image and version sync write paths.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

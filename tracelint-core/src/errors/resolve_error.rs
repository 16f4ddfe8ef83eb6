//! Provenance and image-reference resolution errors.

use crate::types::AssetId;

/// Errors from walking trace pointers back toward an origin asset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("trace on {from} points at unregistered asset {to}")]
    MissingCounterparty { from: AssetId, to: AssetId },

    #[error("trace on {0} points at itself")]
    SelfReference(AssetId),

    #[error("trace cycle detected starting from {start} (revisited {repeated})")]
    Cycle { start: AssetId, repeated: AssetId },

    #[error("asset {0} is not registered")]
    UnknownAsset(AssetId),
}

/// Errors from following `image_sync` pointers to a literal image.
///
/// Structurally the same walk as [`ResolveError`], but image pointers may
/// target a chain record as well as an asset, so targets are named by
/// their display form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageRefError {
    #[error("image pointer on {0} points at itself")]
    SelfReference(String),

    #[error("image pointer cycle detected starting from {start} (revisited {repeated})")]
    Cycle { start: String, repeated: String },

    #[error("image pointer on {from} targets unregistered entity {to}")]
    MissingTarget { from: String, to: String },

    #[error("{0} has no image to resolve")]
    NoImages(String),
}

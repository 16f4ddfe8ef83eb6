//! External price-feed catalog errors.

/// Errors from fetching or decoding the external identifier catalog.
///
/// These never fail a validation run on their own; an unreachable
/// catalog degrades the dependent checks to inconclusive.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(String),

    #[error("catalog response could not be decoded: {0}")]
    Decode(String),
}

//! Image reference resolution.
//!
//! The same pointer-chasing shape as provenance resolution, but over
//! `images[]` entries: an `image_sync` pointer defers to the first image
//! of the referenced chain or asset, and the walk stops at the first
//! literal entry.

pub mod sync;

use std::fmt;

use tracelint_core::errors::ImageRefError;
use tracelint_core::types::collections::FxHashSet;
use tracelint_core::types::AssetId;
use tracelint_registry::records::{ImageEntry, ImageSyncTarget};
use tracelint_registry::Snapshot;

/// What an image pointer can target: a chain record or an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageHost {
    Chain(String),
    Asset(AssetId),
}

impl ImageHost {
    pub fn from_target(target: &ImageSyncTarget) -> Self {
        match &target.base_denom {
            Some(base) => ImageHost::Asset(AssetId::new(target.chain_name.clone(), base.clone())),
            None => ImageHost::Chain(target.chain_name.clone()),
        }
    }
}

impl fmt::Display for ImageHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageHost::Chain(name) => write!(f, "{name}"),
            ImageHost::Asset(id) => write!(f, "{id}"),
        }
    }
}

/// Follow `image_sync` pointers from `host` until a literal image.
///
/// Fails on a pointer at the host itself, a longer cycle, a target that
/// is not registered, or a hop with no image to offer.
pub fn resolve_image(snapshot: &Snapshot, host: &ImageHost) -> Result<ImageEntry, ImageRefError> {
    let mut current = host.clone();
    let mut visited = FxHashSet::default();
    visited.insert(current.clone());

    loop {
        let images = images_of(snapshot, &current)?;
        let Some(first) = images.first() else {
            return Err(ImageRefError::NoImages(current.to_string()));
        };
        let Some(target) = &first.image_sync else {
            return Ok(first.clone());
        };
        let next = ImageHost::from_target(target);
        if next == current {
            return Err(ImageRefError::SelfReference(current.to_string()));
        }
        if !visited.insert(next.clone()) {
            return Err(ImageRefError::Cycle {
                start: host.to_string(),
                repeated: next.to_string(),
            });
        }
        current = next;
    }
}

fn images_of<'s>(
    snapshot: &'s Snapshot,
    host: &ImageHost,
) -> Result<&'s [ImageEntry], ImageRefError> {
    let images = match host {
        ImageHost::Chain(name) => snapshot
            .chain(name)
            .map(|entry| entry.record.images.as_deref()),
        ImageHost::Asset(id) => snapshot.asset(id).map(|asset| asset.images.as_deref()),
    };
    match images {
        None => Err(ImageRefError::MissingTarget {
            from: host.to_string(),
            to: host.to_string(),
        }),
        Some(images) => Ok(images.unwrap_or(&[])),
    }
}

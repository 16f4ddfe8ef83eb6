//! Image synchronization utility.
//!
//! Four passes over the registry, each writing only the records it
//! actually changes:
//! 1. fold the legacy single-image field into `images[]`;
//! 2. turn images that duplicate the origin's image into `image_sync`
//!    pointers at the origin;
//! 3. pull resolved URIs and theme into every pointer entry;
//! 4. republish the first image into the legacy field.
//!
//! With no underlying data change a second run writes nothing.

use tracelint_core::errors::SyncError;
use tracelint_core::types::AssetId;
use tracelint_registry::records::{Asset, ImageEntry, ImageSyncTarget, LogoUris};
use tracelint_registry::sync::SyncStats;
use tracelint_registry::{RegistryStore, Snapshot};

use super::{resolve_image, ImageHost};

pub fn sync_images(store: &RegistryStore) -> Result<SyncStats, SyncError> {
    let mut stats = SyncStats::default();
    stats.writes += fold_legacy_uris(store)?;
    stats.writes += define_origin_pointers(store)?;
    stats.writes += propagate_resolved(store)?;
    stats.writes += republish_legacy_uris(store)?;
    tracing::info!(writes = stats.writes, "image sync complete");
    Ok(stats)
}

/// Pass 1: every record with a legacy `logo_URIs` gets a matching
/// `images[]` entry; assets with neither inherit a pointer at their
/// provenance origin.
fn fold_legacy_uris(store: &RegistryStore) -> Result<usize, SyncError> {
    let mut writes = 0;
    for dir in store.list_chain_dirs()? {
        let mut chain = store.read_chain(&dir)?;
        if let Some(logo) = chain.logo_uris.clone().filter(|l| !l.is_empty()) {
            if let Some(images) = merge_logo_into_images(&logo, chain.images.as_deref()) {
                chain.images = Some(images);
                store.write_chain(&dir, &chain)?;
                writes += 1;
            }
        }

        let Some(mut list) = store.read_asset_list(&dir)? else {
            continue;
        };
        let mut changed = false;
        for asset in &mut list.assets {
            let logo = asset.logo_uris.clone().filter(|l| !l.is_empty());
            match logo {
                Some(logo) => {
                    if let Some(images) = merge_logo_into_images(&logo, asset.images.as_deref()) {
                        asset.images = Some(images);
                        changed = true;
                    }
                }
                None => {
                    if asset.images.is_none() {
                        if let Some(pointer) = origin_pointer(asset) {
                            asset.images = Some(vec![ImageEntry {
                                image_sync: Some(pointer),
                                ..Default::default()
                            }]);
                            changed = true;
                        }
                    }
                }
            }
        }
        if changed {
            store.write_asset_list(&dir, &list)?;
            writes += 1;
        }
    }
    Ok(writes)
}

/// Pass 2: an image carrying the same URIs as the origin's first image
/// becomes a pointer at the origin.
fn define_origin_pointers(store: &RegistryStore) -> Result<usize, SyncError> {
    let snapshot = Snapshot::load(store)?;
    let mut writes = 0;
    for dir in store.list_chain_dirs()? {
        let Some(mut list) = store.read_asset_list(&dir)? else {
            continue;
        };
        let mut changed = false;
        for asset in &mut list.assets {
            let Some(pointer) = origin_pointer(asset) else {
                continue;
            };
            let Some(images) = asset.images.as_mut() else {
                continue;
            };
            if images
                .iter()
                .any(|image| image.image_sync.as_ref() == Some(&pointer))
            {
                continue;
            }
            let origin_id = AssetId::new(
                pointer.chain_name.clone(),
                pointer.base_denom.clone().unwrap_or_default(),
            );
            let Some(origin_first) = snapshot
                .asset(&origin_id)
                .and_then(|a| a.images.as_ref())
                .and_then(|images| images.first())
            else {
                continue;
            };
            for image in images.iter_mut() {
                if image.image_sync.is_some() {
                    continue;
                }
                let png_matches = image.png.is_some() && image.png == origin_first.png;
                let svg_matches = image.svg.is_some() && image.svg == origin_first.svg;
                if png_matches || svg_matches {
                    *image = ImageEntry {
                        image_sync: Some(pointer.clone()),
                        png: origin_first.png.clone(),
                        svg: origin_first.svg.clone(),
                        theme: origin_first.theme.clone(),
                    };
                    changed = true;
                }
            }
        }
        if changed {
            store.write_asset_list(&dir, &list)?;
            writes += 1;
        }
    }
    Ok(writes)
}

/// Pass 3: every pointer entry carries its resolved target's URIs and
/// theme. Pointers that fail to resolve are left for validation to
/// report.
fn propagate_resolved(store: &RegistryStore) -> Result<usize, SyncError> {
    let snapshot = Snapshot::load(store)?;
    let mut writes = 0;
    for dir in store.list_chain_dirs()? {
        let mut chain = store.read_chain(&dir)?;
        if let Some(images) = chain.images.as_mut() {
            if pull_into_pointers(&snapshot, images) {
                store.write_chain(&dir, &chain)?;
                writes += 1;
            }
        }

        let Some(mut list) = store.read_asset_list(&dir)? else {
            continue;
        };
        let mut changed = false;
        for asset in &mut list.assets {
            if let Some(images) = asset.images.as_mut() {
                changed |= pull_into_pointers(&snapshot, images);
            }
        }
        if changed {
            store.write_asset_list(&dir, &list)?;
            writes += 1;
        }
    }
    Ok(writes)
}

fn pull_into_pointers(snapshot: &Snapshot, images: &mut [ImageEntry]) -> bool {
    let mut changed = false;
    for image in images {
        let Some(target) = &image.image_sync else {
            continue;
        };
        let Ok(resolved) = resolve_image(snapshot, &ImageHost::from_target(target)) else {
            continue;
        };
        if image.png != resolved.png || image.svg != resolved.svg || image.theme != resolved.theme {
            image.png = resolved.png;
            image.svg = resolved.svg;
            image.theme = resolved.theme;
            changed = true;
        }
    }
    changed
}

/// Pass 4: the legacy field mirrors the first image, for consumers that
/// still read it.
fn republish_legacy_uris(store: &RegistryStore) -> Result<usize, SyncError> {
    let mut writes = 0;
    for dir in store.list_chain_dirs()? {
        let mut chain = store.read_chain(&dir)?;
        if chain.logo_uris.is_some() {
            if let Some(logo) = first_image_uris(chain.images.as_deref()) {
                if chain.logo_uris.as_ref() != Some(&logo) {
                    chain.logo_uris = Some(logo);
                    store.write_chain(&dir, &chain)?;
                    writes += 1;
                }
            }
        }

        let Some(mut list) = store.read_asset_list(&dir)? else {
            continue;
        };
        let mut changed = false;
        for asset in &mut list.assets {
            if asset.logo_uris.is_none() {
                continue;
            }
            if let Some(logo) = first_image_uris(asset.images.as_deref()) {
                if asset.logo_uris.as_ref() != Some(&logo) {
                    asset.logo_uris = Some(logo);
                    changed = true;
                }
            }
        }
        if changed {
            store.write_asset_list(&dir, &list)?;
            writes += 1;
        }
    }
    Ok(writes)
}

fn first_image_uris(images: Option<&[ImageEntry]>) -> Option<LogoUris> {
    let first = images?.first()?;
    if first.png.is_none() && first.svg.is_none() {
        return None;
    }
    Some(LogoUris {
        png: first.png.clone(),
        svg: first.svg.clone(),
    })
}

/// Merge the legacy URIs into the image list. Returns the new list only
/// when something changed.
fn merge_logo_into_images(
    logo: &LogoUris,
    images: Option<&[ImageEntry]>,
) -> Option<Vec<ImageEntry>> {
    let Some(existing) = images else {
        return Some(vec![ImageEntry {
            png: logo.png.clone(),
            svg: logo.svg.clone(),
            ..Default::default()
        }]);
    };
    let mut images = existing.to_vec();

    let full_match = images
        .iter()
        .any(|image| logo.png == image.png && logo.svg == image.svg);
    if full_match {
        return None;
    }

    if let Some(partial) = images
        .iter_mut()
        .find(|image| {
            (logo.png.is_some() && logo.png == image.png)
                || (logo.svg.is_some() && logo.svg == image.svg)
        })
    {
        partial.png = logo.png.clone().or(partial.png.take());
        partial.svg = logo.svg.clone().or(partial.svg.take());
        return Some(images);
    }

    images.push(ImageEntry {
        png: logo.png.clone(),
        svg: logo.svg.clone(),
        ..Default::default()
    });
    Some(images)
}

fn origin_pointer(asset: &Asset) -> Option<ImageSyncTarget> {
    asset.last_trace().map(|trace| ImageSyncTarget {
        chain_name: trace.counterparty.chain_name.clone(),
        base_denom: Some(trace.counterparty.base_denom.clone()),
    })
}

//! Asset-scope checks.

use sha2::{Digest, Sha256};
use tracelint_core::types::AssetId;
use tracelint_registry::records::Asset;
use tracelint_registry::{ChainEntry, Snapshot};

use crate::channel;
use crate::images::{resolve_image, ImageHost};
use crate::provenance::{TraceGraph, PRICE_IDENTITY_TYPES};

use super::engine::RunContext;
use super::{CheckId, Outcome};

/// Chains whose contract tokens use a tag of their own instead of the
/// common one. A fixed table; new patterns are not inferred.
const CONTRACT_TAG_OVERRIDES: &[(&str, &str)] = &[("secretnetwork", "snip20")];

const TRANSFER_PORT: &str = "transfer";

pub fn run(
    check: CheckId,
    snapshot: &Snapshot,
    graph: &TraceGraph,
    entry: &ChainEntry,
    asset: &Asset,
    ctx: &mut RunContext,
) -> Outcome {
    let id = AssetId::new(entry.dir.name.clone(), asset.base.clone());
    match check {
        CheckId::UniqueBaseDenom => unique_base_denom(entry, asset, ctx),
        CheckId::DenomUnitsValid => denom_units_valid(asset),
        CheckId::TypeAssetMatchesShape => type_asset_matches_shape(entry, asset),
        CheckId::TraceCounterpartyValid => trace_counterparty_valid(snapshot, &id, asset),
        CheckId::HashDenomAccuracy => hash_denom_accuracy(asset),
        CheckId::ChannelAccuracy => channel_accuracy(snapshot, entry, asset),
        CheckId::ImageSyncValid => image_sync_valid(snapshot, &id, asset),
        CheckId::IdentifierInCatalog => identifier_in_catalog(snapshot, graph, &id, asset, ctx),
        CheckId::IdentifierOriginConsistent => {
            identifier_origin_consistent(graph, &id, asset, ctx)
        }
        _ => {
            tracing::error!(check = check.name(), "not an asset-scope check");
            Outcome::Inconclusive
        }
    }
}

fn unique_base_denom(entry: &ChainEntry, asset: &Asset, ctx: &mut RunContext) -> Outcome {
    if asset.base.is_empty() {
        return Outcome::Fail("asset has no base denom".to_string());
    }
    let seen = ctx
        .seen_base_denoms
        .entry(entry.dir.name.clone())
        .or_default();
    if seen.insert(asset.base.clone()) {
        Outcome::Pass
    } else {
        Outcome::Fail(format!(
            "base denom {:?} appears more than once in the asset list",
            asset.base,
        ))
    }
}

fn denom_units_valid(asset: &Asset) -> Outcome {
    let Some(display) = asset.display.as_deref().filter(|s| !s.is_empty()) else {
        return Outcome::Fail("display denom is missing".to_string());
    };
    let matched = asset
        .denom_units
        .iter()
        .any(|u| u.denom == display || u.aliases.iter().any(|a| a == display));
    if matched {
        Outcome::Pass
    } else {
        Outcome::Fail(format!(
            "display {display:?} does not resolve to any denom unit",
        ))
    }
}

fn type_asset_matches_shape(entry: &ChainEntry, asset: &Asset) -> Outcome {
    let Some(expected) = expected_type_asset(&entry.dir.name, &asset.base) else {
        return Outcome::Pass;
    };
    match asset.type_asset.as_deref() {
        None => Outcome::Fail(format!(
            "type_asset is missing; the base denom's shape implies {expected:?}",
        )),
        Some(actual) if actual == expected => Outcome::Pass,
        Some(actual) => Outcome::Fail(format!(
            "type_asset {actual:?} does not match the base denom's shape (expected {expected:?})",
        )),
    }
}

/// The fixed pattern table mapping a base denom's shape to its tag.
fn expected_type_asset(chain_name: &str, base: &str) -> Option<&'static str> {
    if is_hash_denom(base) {
        return Some("ics20");
    }
    if base.starts_with("cw20:") {
        let tag = CONTRACT_TAG_OVERRIDES
            .iter()
            .find(|(chain, _)| *chain == chain_name)
            .map(|(_, tag)| *tag)
            .unwrap_or("cw20");
        return Some(tag);
    }
    if is_hex_address(base) {
        return Some("erc20");
    }
    None
}

fn is_hash_denom(base: &str) -> bool {
    base.strip_prefix("ibc/").is_some_and(|hash| {
        hash.len() == 64
            && hash
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
    })
}

fn is_hex_address(base: &str) -> bool {
    base.strip_prefix("0x")
        .is_some_and(|rest| rest.len() == 40 && rest.chars().all(|c| c.is_ascii_hexdigit()))
}

fn trace_counterparty_valid(snapshot: &Snapshot, id: &AssetId, asset: &Asset) -> Outcome {
    let mut problems = Vec::new();
    for trace in &asset.traces {
        if trace.kind().is_none() {
            problems.push(format!("unrecognized trace type {:?}", trace.trace_type));
        }
        let counterparty = &trace.counterparty;
        if counterparty.chain_name.is_empty() || counterparty.base_denom.is_empty() {
            problems.push("trace counterparty is incomplete".to_string());
            continue;
        }
        let counterparty_id = AssetId::new(
            counterparty.chain_name.clone(),
            counterparty.base_denom.clone(),
        );
        if counterparty_id == *id {
            problems.push("trace counterparty equals the asset itself".to_string());
            continue;
        }
        if snapshot.asset(&counterparty_id).is_none() {
            problems.push(format!(
                "trace counterparty {counterparty_id} is not a registered asset",
            ));
        }
    }
    if problems.is_empty() {
        Outcome::Pass
    } else {
        Outcome::Fail(problems.join("; "))
    }
}

/// A hash-style base denom is the uppercase SHA-256 of its transfer
/// path. The path is the trace's declared multi-hop `path` when present,
/// otherwise `{port}/{channel}/{counterparty base}`.
fn hash_denom_accuracy(asset: &Asset) -> Outcome {
    let Some(declared_hash) = asset.base.strip_prefix("ibc/") else {
        return Outcome::Pass;
    };
    let Some(trace) = asset
        .last_trace()
        .filter(|t| t.kind().is_some_and(|k| k.is_transfer()))
    else {
        return Outcome::Fail(
            "hash-style base denom without an active transfer trace".to_string(),
        );
    };
    let chain_side = trace.chain.as_ref();
    let path = match chain_side.and_then(|c| c.path.clone()) {
        Some(path) => path,
        None => {
            let Some(channel) = chain_side.and_then(|c| c.channel_id.as_deref()) else {
                return Outcome::Fail("transfer trace declares no local channel id".to_string());
            };
            let port = chain_side
                .and_then(|c| c.port.as_deref())
                .unwrap_or(TRANSFER_PORT);
            format!("{port}/{channel}/{}", trace.counterparty.base_denom)
        }
    };
    let digest = Sha256::digest(path.as_bytes());
    let computed: String = digest.iter().map(|b| format!("{b:02X}")).collect();
    if declared_hash == computed {
        Outcome::Pass
    } else {
        Outcome::Fail(format!(
            "base denom hash {declared_hash} does not match {computed}, computed over {path:?}",
        ))
    }
}

fn channel_accuracy(snapshot: &Snapshot, entry: &ChainEntry, asset: &Asset) -> Outcome {
    let failures = channel::validate_transfer_channel(snapshot, &entry.dir.name, asset);
    if failures.is_empty() {
        Outcome::Pass
    } else {
        Outcome::Fail(failures.join("; "))
    }
}

fn image_sync_valid(snapshot: &Snapshot, id: &AssetId, asset: &Asset) -> Outcome {
    let Some(images) = asset.images.as_ref() else {
        return Outcome::Pass;
    };
    let self_host = ImageHost::Asset(id.clone());
    let mut problems = Vec::new();
    for image in images {
        let Some(target) = &image.image_sync else {
            continue;
        };
        let target_host = ImageHost::from_target(target);
        if target_host == self_host {
            problems.push("image pointer points at the asset itself".to_string());
            continue;
        }
        if let Err(error) = resolve_image(snapshot, &target_host) {
            problems.push(error.to_string());
        }
    }
    if problems.is_empty() {
        Outcome::Pass
    } else {
        Outcome::Fail(problems.join("; "))
    }
}

fn identifier_in_catalog(
    snapshot: &Snapshot,
    graph: &TraceGraph,
    id: &AssetId,
    asset: &Asset,
    ctx: &mut RunContext,
) -> Outcome {
    let Some(identifier) = asset.coingecko_id.as_deref().filter(|s| !s.is_empty()) else {
        return Outcome::Pass;
    };
    let Some(catalog) = ctx.catalog else {
        // Degraded: the collaborator was unreachable or the run is
        // offline. Not a failure.
        return Outcome::Inconclusive;
    };
    let Some(listing) = catalog.get(identifier) else {
        return Outcome::Fail(format!(
            "identifier {identifier:?} is not present in the price catalog",
        ));
    };

    // Cosmetic comparison against the origin's recorded name and
    // symbol; both disagreeing is worth a warning, never a failure.
    let origin_name = graph
        .resolve_field(snapshot, id, PRICE_IDENTITY_TYPES, |a| {
            a.name.clone().filter(|s| !s.is_empty())
        })
        .ok()
        .flatten();
    let origin_symbol = graph
        .resolve_field(snapshot, id, PRICE_IDENTITY_TYPES, |a| {
            a.symbol.clone().filter(|s| !s.is_empty())
        })
        .ok()
        .flatten();
    if let (Some(name), Some(symbol)) = (origin_name, origin_symbol) {
        if name != listing.name && !symbol.eq_ignore_ascii_case(&listing.symbol) {
            return Outcome::Warn(format!(
                "origin name/symbol {name:?}/{symbol:?} do not match catalog {:?}/{:?}",
                listing.name, listing.symbol,
            ));
        }
    }
    Outcome::Pass
}

fn identifier_origin_consistent(
    graph: &TraceGraph,
    id: &AssetId,
    asset: &Asset,
    ctx: &mut RunContext,
) -> Outcome {
    let Some(identifier) = asset.coingecko_id.as_deref().filter(|s| !s.is_empty()) else {
        return Outcome::Pass;
    };
    let Some(group) = ctx.groups.get(identifier) else {
        return Outcome::Pass;
    };
    if group.mainnet_origins.len() > 1 {
        let origins: Vec<String> = group.mainnet_origins.iter().map(ToString::to_string).collect();
        return Outcome::Fail(format!(
            "ambiguous mainnet origin for identifier {identifier:?}: {}",
            origins.join(" vs "),
        ));
    }
    let own = match graph.resolve_origin(id, PRICE_IDENTITY_TYPES) {
        Ok(origin) => origin,
        Err(error) => return Outcome::Fail(error.to_string()),
    };
    match &group.origin {
        Some(origin) if *origin != own => Outcome::Fail(format!(
            "resolved origin {own} does not match group origin {origin} for identifier \
             {identifier:?}",
        )),
        _ => Outcome::Pass,
    }
}

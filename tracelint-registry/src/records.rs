//! Serde types for the registry record documents.
//!
//! Every field the engine does not interpret is carried through a
//! flattened `extra` map so the write paths round-trip documents without
//! dropping anything another tool owns.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracelint_core::types::TraceType;

/// `chain.json`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainRecord {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub chain_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bech32_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slip44: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fees: Option<Fees>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staking: Option<Staking>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codebase: Option<Codebase>,
    #[serde(rename = "logo_URIs", skip_serializing_if = "Option::is_none")]
    pub logo_uris: Option<LogoUris>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageEntry>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChainRecord {
    pub fn is_cosmos(&self) -> bool {
        self.chain_type.as_deref() == Some("cosmos")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fees {
    pub fee_tokens: Vec<FeeToken>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeToken {
    pub denom: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Staking {
    pub staking_tokens: Vec<StakingToken>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingToken {
    pub denom: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `codebase` block of `chain.json`: the version fields shared with
/// `versions.json` entries, plus whatever else the chain records there.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Codebase {
    #[serde(flatten)]
    pub version: VersionFields,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The version fields `chain.json::codebase` and `versions.json` entries
/// have in common. Version sync copies exactly this set in both
/// directions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub compatible_versions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binaries: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consensus: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cosmwasm: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ibc: Option<Value>,
}

impl VersionFields {
    /// Two version entries are compatible when their
    /// `compatible_versions` arrays share any member.
    pub fn is_compatible_with(&self, other: &VersionFields) -> bool {
        self.compatible_versions
            .iter()
            .any(|v| other.compatible_versions.contains(v))
    }

    pub fn is_empty(&self) -> bool {
        *self == VersionFields::default()
    }
}

/// `versions.json`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionsRecord {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub chain_name: String,
    pub versions: Vec<VersionEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub version: VersionFields,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `assetlist.json`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetListRecord {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub chain_name: String,
    pub assets: Vec<Asset>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Asset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub denom_units: Vec<DenomUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_asset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub traces: Vec<Trace>,
    #[serde(rename = "logo_URIs", skip_serializing_if = "Option::is_none")]
    pub logo_uris: Option<LogoUris>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coingecko_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Asset {
    /// The active trace: only the last element of `traces` is current;
    /// earlier elements are the hops further back toward origin.
    pub fn last_trace(&self) -> Option<&Trace> {
        self.traces.last()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DenomUnit {
    pub denom: String,
    pub exponent: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// One provenance edge in `traces[]`. The `type` string stays raw so
/// write paths round-trip it; [`Trace::kind`] is the typed view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Trace {
    #[serde(rename = "type")]
    pub trace_type: String,
    pub counterparty: TraceCounterparty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<TraceChainSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Trace {
    /// The parsed edge type; `None` for anything outside the fixed
    /// vocabulary.
    pub fn kind(&self) -> Option<TraceType> {
        TraceType::parse(&self.trace_type)
    }
}

/// The asset this trace was produced from, plus the counterparty side of
/// the channel for transfer traces.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceCounterparty {
    pub chain_name: String,
    pub base_denom: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
}

/// The local side of the channel for transfer traces.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceChainSide {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoUris {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub png: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
}

impl LogoUris {
    pub fn is_empty(&self) -> bool {
        self.png.is_none() && self.svg.is_none()
    }
}

/// One element of `images[]`: a literal image or an `image_sync` pointer
/// at another entity's image.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_sync: Option<ImageSyncTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub png: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Value>,
}

/// Target of an `image_sync` pointer. Without a `base_denom` it points
/// at a chain record rather than an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSyncTarget {
    pub chain_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_denom: Option<String>,
}

/// `_IBC/<chain_1>-<chain_2>.json`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionRecord {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub chain_1: ConnectionSide,
    pub chain_2: ConnectionSide,
    pub channels: Vec<ConnectionChannel>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSide {
    pub chain_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionChannel {
    pub chain_1: ChannelEnd,
    pub chain_2: ChannelEnd,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<ChannelTags>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelEnd {
    pub channel_id: String,
    pub port_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelTags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dex: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConnectionChannel {
    pub fn is_preferred(&self) -> bool {
        self.tags.as_ref().and_then(|t| t.preferred).unwrap_or(false)
    }
}

//! Entity identities and the fixed vocabularies of the registry.
//!
//! Records keep these values as raw strings so write paths round-trip
//! unrecognized data untouched; the enums here are the parsed, typed
//! views the engine works with.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a single asset: the chain it is listed on plus its base
/// denomination, unique within that chain's asset list.
///
/// Usable directly as a map key; the registry itself identifies assets by
/// this pair everywhere a record points at another record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId {
    pub chain_name: String,
    pub base_denom: String,
}

impl AssetId {
    pub fn new(chain_name: impl Into<String>, base_denom: impl Into<String>) -> Self {
        Self {
            chain_name: chain_name.into(),
            base_denom: base_denom.into(),
        }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Base denoms may contain '/', so the separator is ':'.
        write!(f, "{}:{}", self.chain_name, self.base_denom)
    }
}

/// Which network-type root of the registry tree a chain lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkType {
    Mainnet,
    Testnet,
    Devnet,
}

impl NetworkType {
    pub fn parse(value: &str) -> Option<NetworkType> {
        match value {
            "mainnet" => Some(NetworkType::Mainnet),
            "testnet" => Some(NetworkType::Testnet),
            "devnet" => Some(NetworkType::Devnet),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NetworkType::Mainnet => "mainnet",
            NetworkType::Testnet => "testnet",
            NetworkType::Devnet => "devnet",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge type of a provenance trace.
///
/// The wire names are the kebab-case strings stored in `traces[].type`.
/// Which types are traversable depends on the caller: channel validation
/// only follows transfer hops, price-identifier grouping additionally
/// follows mintage hops but stops at bridges, wraps, and derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceType {
    Ibc,
    IbcCw20,
    IbcBridge,
    Bridge,
    LiquidStake,
    Synthetic,
    Wrapped,
    AdditionalMintage,
    TestMintage,
    LegacyMintage,
}

impl TraceType {
    pub fn parse(value: &str) -> Option<TraceType> {
        match value {
            "ibc" => Some(TraceType::Ibc),
            "ibc-cw20" => Some(TraceType::IbcCw20),
            "ibc-bridge" => Some(TraceType::IbcBridge),
            "bridge" => Some(TraceType::Bridge),
            "liquid-stake" => Some(TraceType::LiquidStake),
            "synthetic" => Some(TraceType::Synthetic),
            "wrapped" => Some(TraceType::Wrapped),
            "additional-mintage" => Some(TraceType::AdditionalMintage),
            "test-mintage" => Some(TraceType::TestMintage),
            "legacy-mintage" => Some(TraceType::LegacyMintage),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TraceType::Ibc => "ibc",
            TraceType::IbcCw20 => "ibc-cw20",
            TraceType::IbcBridge => "ibc-bridge",
            TraceType::Bridge => "bridge",
            TraceType::LiquidStake => "liquid-stake",
            TraceType::Synthetic => "synthetic",
            TraceType::Wrapped => "wrapped",
            TraceType::AdditionalMintage => "additional-mintage",
            TraceType::TestMintage => "test-mintage",
            TraceType::LegacyMintage => "legacy-mintage",
        }
    }

    /// Whether this edge is a protocol transfer hop, the only kind that
    /// carries channel data and is subject to channel cross-validation.
    pub fn is_transfer(self) -> bool {
        matches!(self, TraceType::Ibc | TraceType::IbcCw20)
    }
}

impl fmt::Display for TraceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

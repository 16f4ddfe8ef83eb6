//! The dependency-gated check engine.
//!
//! Checks are a fixed, typed set: each [`CheckId`] declares its scope
//! (chain- or asset-keyed) and its prerequisites. The engine runs them
//! in topological order per entity, skips a check whose prerequisites
//! did not pass for that same entity, and aggregates every failure into
//! one report so a single run surfaces everything wrong.

pub mod asset;
pub mod chain;
pub mod engine;
pub mod report;

pub use engine::{CheckEngine, RunContext};
pub use report::{Report, ReportGroup, ValidationFailed};

use std::fmt;

use tracelint_core::types::AssetId;

/// What kind of entity a check is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckScope {
    Chain,
    Asset,
}

/// Result of one check for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(String),
    Warn(String),
    /// Not run to a verdict: prerequisites unmet, or a required external
    /// collaborator was unavailable. Never counted as a failure.
    Inconclusive,
}

impl Outcome {
    /// Whether a dependent check may run on top of this outcome.
    pub fn passed(&self) -> bool {
        matches!(self, Outcome::Pass | Outcome::Warn(_))
    }
}

/// Entity a check outcome is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Chain(String),
    Asset(AssetId),
}

impl Identity {
    pub fn kind(&self) -> &'static str {
        match self {
            Identity::Chain(_) => "chain",
            Identity::Asset(_) => "asset",
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Chain(name) => write!(f, "{name}"),
            Identity::Asset(id) => write!(f, "{id}"),
        }
    }
}

/// The fixed check set. Declaration order is the tie-break for the
/// topological execution order, so related checks stay adjacent in the
/// report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckId {
    // Chain scope.
    ChainNameMatchesDirectory,
    ChainIdValid,
    NetworkTypeValid,
    Bech32PrefixFormat,
    CoinTypeValid,
    FeeTokensRegistered,
    StakingTokensRegistered,
    SchemaReference,
    // Asset scope.
    UniqueBaseDenom,
    DenomUnitsValid,
    TypeAssetMatchesShape,
    TraceCounterpartyValid,
    HashDenomAccuracy,
    ChannelAccuracy,
    ImageSyncValid,
    IdentifierInCatalog,
    IdentifierOriginConsistent,
}

impl CheckId {
    pub const ALL: &'static [CheckId] = &[
        CheckId::ChainNameMatchesDirectory,
        CheckId::ChainIdValid,
        CheckId::NetworkTypeValid,
        CheckId::Bech32PrefixFormat,
        CheckId::CoinTypeValid,
        CheckId::FeeTokensRegistered,
        CheckId::StakingTokensRegistered,
        CheckId::SchemaReference,
        CheckId::UniqueBaseDenom,
        CheckId::DenomUnitsValid,
        CheckId::TypeAssetMatchesShape,
        CheckId::TraceCounterpartyValid,
        CheckId::HashDenomAccuracy,
        CheckId::ChannelAccuracy,
        CheckId::ImageSyncValid,
        CheckId::IdentifierInCatalog,
        CheckId::IdentifierOriginConsistent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CheckId::ChainNameMatchesDirectory => "chain_name_matches_directory",
            CheckId::ChainIdValid => "chain_id_valid",
            CheckId::NetworkTypeValid => "network_type_valid",
            CheckId::Bech32PrefixFormat => "bech32_prefix_format",
            CheckId::CoinTypeValid => "coin_type_valid",
            CheckId::FeeTokensRegistered => "fee_tokens_registered",
            CheckId::StakingTokensRegistered => "staking_tokens_registered",
            CheckId::SchemaReference => "schema_reference",
            CheckId::UniqueBaseDenom => "unique_base_denom",
            CheckId::DenomUnitsValid => "denom_units_valid",
            CheckId::TypeAssetMatchesShape => "type_asset_matches_shape",
            CheckId::TraceCounterpartyValid => "trace_counterparty_valid",
            CheckId::HashDenomAccuracy => "hash_denom_accuracy",
            CheckId::ChannelAccuracy => "channel_accuracy",
            CheckId::ImageSyncValid => "image_sync_valid",
            CheckId::IdentifierInCatalog => "identifier_in_catalog",
            CheckId::IdentifierOriginConsistent => "identifier_origin_consistent",
        }
    }

    pub fn notice(self) -> &'static str {
        match self {
            CheckId::ChainNameMatchesDirectory => {
                "A chain's declared name must match its directory."
            }
            CheckId::ChainIdValid => "Chain ids must be present and unique across the registry.",
            CheckId::NetworkTypeValid => "Network type must be mainnet, testnet, or devnet.",
            CheckId::Bech32PrefixFormat => "Bech32 prefixes must be lowercase alphanumeric.",
            CheckId::CoinTypeValid => "Coin type must be a non-negative index.",
            CheckId::FeeTokensRegistered => {
                "Every fee token must be registered in the chain's asset list."
            }
            CheckId::StakingTokensRegistered => {
                "Every staking token must be registered in the chain's asset list."
            }
            CheckId::SchemaReference => {
                "A record's schema reference must match the path computed from its location."
            }
            CheckId::UniqueBaseDenom => "Base denoms must be unique within an asset list.",
            CheckId::DenomUnitsValid => {
                "An asset's display must resolve to one of its denom units."
            }
            CheckId::TypeAssetMatchesShape => {
                "type_asset must match the shape of the base denom."
            }
            CheckId::TraceCounterpartyValid => {
                "Trace counterparties must be registered assets distinct from the asset itself."
            }
            CheckId::HashDenomAccuracy => {
                "A hash-style base denom must equal the hash of its transfer path."
            }
            CheckId::ChannelAccuracy => {
                "A transfer trace's channels must match the registered connection record."
            }
            CheckId::ImageSyncValid => "Image pointers must resolve to a registered image.",
            CheckId::IdentifierInCatalog => {
                "External identifiers must exist in the price catalog."
            }
            CheckId::IdentifierOriginConsistent => {
                "Assets sharing an external identifier must share one origin."
            }
        }
    }

    pub fn scope(self) -> CheckScope {
        match self {
            CheckId::ChainNameMatchesDirectory
            | CheckId::ChainIdValid
            | CheckId::NetworkTypeValid
            | CheckId::Bech32PrefixFormat
            | CheckId::CoinTypeValid
            | CheckId::FeeTokensRegistered
            | CheckId::StakingTokensRegistered
            | CheckId::SchemaReference => CheckScope::Chain,
            _ => CheckScope::Asset,
        }
    }

    /// Checks that must have passed for the same entity before this one
    /// runs. Skipped prerequisites leave the dependent inconclusive
    /// rather than piling secondary errors on a known-bad record.
    pub fn prerequisites(self) -> &'static [CheckId] {
        match self {
            CheckId::DenomUnitsValid
            | CheckId::TypeAssetMatchesShape
            | CheckId::TraceCounterpartyValid
            | CheckId::ImageSyncValid => &[CheckId::UniqueBaseDenom],
            CheckId::HashDenomAccuracy
            | CheckId::ChannelAccuracy
            | CheckId::IdentifierInCatalog
            | CheckId::IdentifierOriginConsistent => &[CheckId::TraceCounterpartyValid],
            _ => &[],
        }
    }
}

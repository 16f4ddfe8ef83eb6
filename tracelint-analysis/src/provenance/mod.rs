//! Provenance resolution: walking trace pointers back to an origin
//! asset under a caller-chosen set of traversable edge types.

pub mod graph;

pub use graph::{trace_path, TraceGraph};

use tracelint_core::types::TraceType;

/// Edge types traversed for channel validation: only protocol transfer
/// hops carry channel data.
pub const TRANSFER_TYPES: &[TraceType] = &[TraceType::Ibc, TraceType::IbcCw20];

/// Edge types traversed for price-identifier grouping. Mintage hops are
/// the same economic asset; bridges, wraps, synthetics, and liquid
/// staking derivatives are deliberately excluded so economically
/// distinct assets keep distinct price identities.
pub const PRICE_IDENTITY_TYPES: &[TraceType] = &[
    TraceType::Ibc,
    TraceType::IbcCw20,
    TraceType::AdditionalMintage,
    TraceType::TestMintage,
    TraceType::LegacyMintage,
];

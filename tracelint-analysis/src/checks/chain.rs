//! Chain-scope checks.

use tracelint_core::types::NetworkType;
use tracelint_registry::layout::RecordKind;
use tracelint_registry::ChainEntry;

use super::engine::RunContext;
use super::{CheckId, Outcome};

pub fn run(check: CheckId, entry: &ChainEntry, ctx: &mut RunContext) -> Outcome {
    match check {
        CheckId::ChainNameMatchesDirectory => name_matches_directory(entry),
        CheckId::ChainIdValid => chain_id_valid(entry, ctx),
        CheckId::NetworkTypeValid => network_type_valid(entry),
        CheckId::Bech32PrefixFormat => bech32_prefix_format(entry),
        CheckId::CoinTypeValid => coin_type_valid(entry),
        CheckId::FeeTokensRegistered => fee_tokens_registered(entry),
        CheckId::StakingTokensRegistered => staking_tokens_registered(entry),
        CheckId::SchemaReference => schema_reference(entry),
        _ => {
            tracing::error!(check = check.name(), "not a chain-scope check");
            Outcome::Inconclusive
        }
    }
}

fn name_matches_directory(entry: &ChainEntry) -> Outcome {
    if entry.record.chain_name == entry.dir.name {
        Outcome::Pass
    } else {
        Outcome::Fail(format!(
            "declared chain name {:?} does not match directory {:?}",
            entry.record.chain_name, entry.dir.name,
        ))
    }
}

fn chain_id_valid(entry: &ChainEntry, ctx: &mut RunContext) -> Outcome {
    let Some(chain_id) = entry.record.chain_id.as_deref().filter(|s| !s.is_empty()) else {
        return Outcome::Fail("chain id is missing".to_string());
    };
    match ctx.seen_chain_ids.get(chain_id) {
        Some(first) => Outcome::Fail(format!(
            "chain id {chain_id:?} is already used by {first}",
        )),
        None => {
            ctx.seen_chain_ids
                .insert(chain_id.to_string(), entry.dir.name.clone());
            Outcome::Pass
        }
    }
}

fn network_type_valid(entry: &ChainEntry) -> Outcome {
    match entry.record.network_type.as_deref() {
        None => Outcome::Fail("network type is missing".to_string()),
        Some(value) => match NetworkType::parse(value) {
            Some(_) => Outcome::Pass,
            None => Outcome::Fail(format!("invalid network type {value:?}")),
        },
    }
}

fn bech32_prefix_format(entry: &ChainEntry) -> Outcome {
    if !entry.record.is_cosmos() {
        return Outcome::Pass;
    }
    match entry.record.bech32_prefix.as_deref() {
        None => Outcome::Fail("bech32 prefix is missing".to_string()),
        Some(prefix)
            if !prefix.is_empty()
                && prefix
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) =>
        {
            Outcome::Pass
        }
        Some(prefix) => Outcome::Fail(format!("invalid bech32 prefix {prefix:?}")),
    }
}

fn coin_type_valid(entry: &ChainEntry) -> Outcome {
    match entry.record.slip44 {
        None => Outcome::Warn("coin type (slip44) is missing".to_string()),
        Some(value) if value < 0 => Outcome::Fail(format!("invalid coin type {value}")),
        Some(_) => Outcome::Pass,
    }
}

fn fee_tokens_registered(entry: &ChainEntry) -> Outcome {
    let Some(fees) = entry.record.fees.as_ref() else {
        return Outcome::Pass;
    };
    denoms_registered(entry, fees.fee_tokens.iter().map(|t| t.denom.as_str()), "fee")
}

fn staking_tokens_registered(entry: &ChainEntry) -> Outcome {
    let Some(staking) = entry.record.staking.as_ref() else {
        return Outcome::Pass;
    };
    denoms_registered(
        entry,
        staking.staking_tokens.iter().map(|t| t.denom.as_str()),
        "staking",
    )
}

fn denoms_registered<'a>(
    entry: &ChainEntry,
    denoms: impl Iterator<Item = &'a str>,
    role: &str,
) -> Outcome {
    let mut problems = Vec::new();
    for denom in denoms {
        if denom.is_empty() {
            problems.push(format!("a {role} token has no denom"));
            continue;
        }
        let registered = entry.asset_list().iter().any(|a| a.base == denom);
        if !registered {
            problems.push(format!(
                "{role} token {denom} is not in the chain's asset list"
            ));
        }
    }
    if problems.is_empty() {
        Outcome::Pass
    } else {
        Outcome::Fail(problems.join("; "))
    }
}

fn schema_reference(entry: &ChainEntry) -> Outcome {
    let mut problems = Vec::new();
    check_schema(
        &mut problems,
        RecordKind::Chain,
        entry.record.schema.as_deref(),
        entry,
    );
    if let Some(assets) = entry.assets.as_ref() {
        check_schema(
            &mut problems,
            RecordKind::AssetList,
            assets.schema.as_deref(),
            entry,
        );
    }
    if !problems.is_empty() {
        return Outcome::Fail(problems.join("; "));
    }
    if entry.record.schema.is_none() {
        return Outcome::Warn("chain record declares no schema reference".to_string());
    }
    Outcome::Pass
}

fn check_schema(
    problems: &mut Vec<String>,
    kind: RecordKind,
    declared: Option<&str>,
    entry: &ChainEntry,
) {
    let Some(declared) = declared else {
        return;
    };
    let expected = entry.dir.expected_schema_reference(kind);
    if declared != expected {
        problems.push(format!(
            "{} declares schema {declared:?}, expected {expected:?}",
            kind.file_name(),
        ));
    }
}

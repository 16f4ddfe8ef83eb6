//! Bilateral channel cross-validation.
//!
//! A transfer trace declares channel and port values for both sides of
//! the hop. The connection record between the two chains, canonically
//! located by sorted chain-name pair, is the authority those declared
//! values are checked against.

use tracelint_core::types::{NetworkType, TraceType};
use tracelint_registry::layout::connection_file_name;
use tracelint_registry::records::{Asset, ChannelEnd, ConnectionChannel, ConnectionRecord, Trace};
use tracelint_registry::Snapshot;

const TRANSFER_PORT: &str = "transfer";

/// Declared channel/port values from a transfer trace, with the
/// canonical transfer port filled in where the trace omits it.
struct DeclaredChannel<'a> {
    local_channel: Option<&'a str>,
    local_port: &'a str,
    counterparty_channel: Option<&'a str>,
    counterparty_port: &'a str,
}

impl<'a> DeclaredChannel<'a> {
    fn from_trace(trace: &'a Trace) -> Self {
        let chain = trace.chain.as_ref();
        Self {
            local_channel: chain.and_then(|c| c.channel_id.as_deref()),
            local_port: chain
                .and_then(|c| c.port.as_deref())
                .unwrap_or(TRANSFER_PORT),
            counterparty_channel: trace.counterparty.channel_id.as_deref(),
            counterparty_port: trace.counterparty.port.as_deref().unwrap_or(TRANSFER_PORT),
        }
    }
}

/// Validate the active transfer trace of an asset against the
/// registered connection record. Returns one message per failure; an
/// empty list is a pass. Non-transfer traces are not this validator's
/// business and produce no messages.
pub fn validate_transfer_channel(
    snapshot: &Snapshot,
    chain_name: &str,
    asset: &Asset,
) -> Vec<String> {
    let Some(trace) = asset.last_trace() else {
        return Vec::new();
    };
    let Some(kind) = trace.kind().filter(|k| k.is_transfer()) else {
        return Vec::new();
    };

    let counterparty_chain = trace.counterparty.chain_name.as_str();
    let Some(network) = snapshot.network_type(chain_name) else {
        return vec![format!("chain {chain_name} is not in the snapshot")];
    };

    let Some(connection) = snapshot.connection(network, chain_name, counterparty_chain) else {
        return vec![format!(
            "missing connection registration between {chain_name} and {counterparty_chain} \
             (expected {})",
            connection_file_name(chain_name, counterparty_chain),
        )];
    };

    let Some(local_is_chain_1) = local_side(connection, chain_name, counterparty_chain) else {
        return vec![format!(
            "connection record {} does not name both {chain_name} and {counterparty_chain}",
            connection_file_name(chain_name, counterparty_chain),
        )];
    };

    let declared = DeclaredChannel::from_trace(trace);
    let mut failures = Vec::new();

    let matched = match kind {
        TraceType::Ibc => {
            let candidates: Vec<&ConnectionChannel> = connection
                .channels
                .iter()
                .filter(|ch| {
                    ch.chain_1.port_id == TRANSFER_PORT && ch.chain_2.port_id == TRANSFER_PORT
                })
                .collect();
            if candidates.is_empty() {
                failures.push(format!(
                    "no {TRANSFER_PORT}/{TRANSFER_PORT} channel registered between \
                     {chain_name} and {counterparty_chain}",
                ));
                None
            } else {
                // Prefer the candidate the declared ids point at so a
                // mismatch names the closest registered channel.
                candidates
                    .iter()
                    .find(|ch| {
                        let (local, remote) = sides(ch, local_is_chain_1);
                        declared.local_channel == Some(local.channel_id.as_str())
                            || declared.counterparty_channel == Some(remote.channel_id.as_str())
                    })
                    .or(candidates.first())
                    .copied()
            }
        }
        TraceType::IbcCw20 => {
            let found = connection.channels.iter().find(|ch| {
                let (_, remote) = sides(ch, local_is_chain_1);
                declared.counterparty_channel == Some(remote.channel_id.as_str())
                    && declared.counterparty_port == remote.port_id
            });
            // Which side is chain_1 is registry-determined; if the
            // name-resolved orientation finds nothing, try the other.
            let found = found.or_else(|| {
                connection.channels.iter().find(|ch| {
                    let (_, remote) = sides(ch, !local_is_chain_1);
                    declared.counterparty_channel == Some(remote.channel_id.as_str())
                        && declared.counterparty_port == remote.port_id
                })
            });
            if found.is_none() {
                failures.push(format!(
                    "no channel between {chain_name} and {counterparty_chain} matches \
                     counterparty {}/{}",
                    declared.counterparty_port,
                    declared.counterparty_channel.unwrap_or("<none>"),
                ));
            }
            found
        }
        _ => None,
    };

    if let Some(channel) = matched {
        let (local, remote) = sides(channel, local_is_chain_1);
        compare_end(
            &mut failures,
            "chain",
            declared.local_channel,
            declared.local_port,
            local,
        );
        compare_end(
            &mut failures,
            "counterparty",
            declared.counterparty_channel,
            declared.counterparty_port,
            remote,
        );
    }

    // Registry-wide invariant on the record itself: on mainnet, several
    // default transfer channels are only unambiguous if exactly one is
    // tagged preferred.
    if network == NetworkType::Mainnet {
        if let Some(message) = check_default_channel_ambiguity(connection) {
            failures.push(message);
        }
    }

    failures
}

/// On a mainnet connection record with more than one transfer/transfer
/// channel, exactly one must be tagged preferred.
pub fn check_default_channel_ambiguity(connection: &ConnectionRecord) -> Option<String> {
    let defaults: Vec<&ConnectionChannel> = connection
        .channels
        .iter()
        .filter(|ch| ch.chain_1.port_id == TRANSFER_PORT && ch.chain_2.port_id == TRANSFER_PORT)
        .collect();
    if defaults.len() <= 1 {
        return None;
    }
    let preferred = defaults.iter().filter(|ch| ch.is_preferred()).count();
    if preferred == 1 {
        return None;
    }
    Some(format!(
        "connection {}-{} has {} {TRANSFER_PORT}/{TRANSFER_PORT} channels but {} tagged \
         preferred; exactly one must be",
        connection.chain_1.chain_name,
        connection.chain_2.chain_name,
        defaults.len(),
        preferred,
    ))
}

/// Which of the record's sides is the local chain: `Some(true)` when it
/// is `chain_1`.
fn local_side(
    connection: &ConnectionRecord,
    chain_name: &str,
    counterparty_chain: &str,
) -> Option<bool> {
    if connection.chain_1.chain_name == chain_name && connection.chain_2.chain_name == counterparty_chain
    {
        Some(true)
    } else if connection.chain_2.chain_name == chain_name
        && connection.chain_1.chain_name == counterparty_chain
    {
        Some(false)
    } else {
        None
    }
}

fn sides(channel: &ConnectionChannel, local_is_chain_1: bool) -> (&ChannelEnd, &ChannelEnd) {
    if local_is_chain_1 {
        (&channel.chain_1, &channel.chain_2)
    } else {
        (&channel.chain_2, &channel.chain_1)
    }
}

fn compare_end(
    failures: &mut Vec<String>,
    side: &str,
    declared_channel: Option<&str>,
    declared_port: &str,
    registered: &ChannelEnd,
) {
    match declared_channel {
        None => failures.push(format!(
            "trace {side} side declares no channel id (registered: {})",
            registered.channel_id,
        )),
        Some(channel) if channel != registered.channel_id => failures.push(format!(
            "trace {side} channel id {channel} does not match registered channel id {}",
            registered.channel_id,
        )),
        _ => {}
    }
    if declared_port != registered.port_id {
        failures.push(format!(
            "trace {side} port {declared_port} does not match registered port {}",
            registered.port_id,
        ));
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tracelint_core::types::AssetId;
    use tracelint_registry::layout::ChainDir;
    use tracelint_registry::records::{
        AssetListRecord, ChainRecord, ChannelTags, ConnectionSide, Trace, TraceChainSide,
        TraceCounterparty,
    };
    use tracelint_registry::ChainEntry;

    use super::*;

    fn chain(name: &str, network: NetworkType, assets: Vec<Asset>) -> ChainEntry {
        ChainEntry {
            dir: ChainDir {
                name: name.to_string(),
                network_type: network,
                cosmos: true,
                path: PathBuf::from(name),
            },
            record: ChainRecord {
                chain_name: name.to_string(),
                ..Default::default()
            },
            assets: Some(AssetListRecord {
                chain_name: name.to_string(),
                assets,
                ..Default::default()
            }),
        }
    }

    fn transfer_asset(
        base: &str,
        counterparty_chain: &str,
        counterparty_base: &str,
        local_channel: &str,
        remote_channel: &str,
    ) -> Asset {
        Asset {
            base: base.to_string(),
            traces: vec![Trace {
                trace_type: "ibc".to_string(),
                counterparty: TraceCounterparty {
                    chain_name: counterparty_chain.to_string(),
                    base_denom: counterparty_base.to_string(),
                    channel_id: Some(remote_channel.to_string()),
                    ..Default::default()
                },
                chain: Some(TraceChainSide {
                    channel_id: Some(local_channel.to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn transfer_channel(
        chain_1_channel: &str,
        chain_2_channel: &str,
        preferred: Option<bool>,
    ) -> ConnectionChannel {
        ConnectionChannel {
            chain_1: ChannelEnd {
                channel_id: chain_1_channel.to_string(),
                port_id: TRANSFER_PORT.to_string(),
            },
            chain_2: ChannelEnd {
                channel_id: chain_2_channel.to_string(),
                port_id: TRANSFER_PORT.to_string(),
            },
            tags: preferred.map(|p| ChannelTags {
                preferred: Some(p),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn connection(a: &str, b: &str, channels: Vec<ConnectionChannel>) -> ConnectionRecord {
        ConnectionRecord {
            chain_1: ConnectionSide {
                chain_name: a.to_string(),
                ..Default::default()
            },
            chain_2: ConnectionSide {
                chain_name: b.to_string(),
                ..Default::default()
            },
            channels,
            ..Default::default()
        }
    }

    fn fixture(channels: Vec<ConnectionChannel>) -> Snapshot {
        Snapshot::from_entries(vec![
            chain("cosmoshub", NetworkType::Mainnet, vec![Asset {
                base: "uatom".into(),
                ..Default::default()
            }]),
            chain(
                "osmosis",
                NetworkType::Mainnet,
                vec![transfer_asset("ibc/ATOM", "cosmoshub", "uatom", "channel-0", "channel-141")],
            ),
        ])
        .with_connections(vec![(
            NetworkType::Mainnet,
            connection("cosmoshub", "osmosis", channels),
        )])
    }

    fn osmosis_asset(snapshot: &Snapshot) -> &Asset {
        snapshot.asset(&AssetId::new("osmosis", "ibc/ATOM")).unwrap()
    }

    #[test]
    fn matching_channel_passes() {
        // osmosis sorts after cosmoshub, so osmosis is chain_2.
        let snapshot = fixture(vec![transfer_channel("channel-141", "channel-0", None)]);
        let failures = validate_transfer_channel(&snapshot, "osmosis", osmosis_asset(&snapshot));
        assert!(failures.is_empty(), "{failures:?}");
    }

    #[test]
    fn mismatched_channel_ids_name_both_sides() {
        let snapshot = fixture(vec![transfer_channel("channel-999", "channel-0", None)]);
        let failures = validate_transfer_channel(&snapshot, "osmosis", osmosis_asset(&snapshot));
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("channel-141"));
        assert!(failures[0].contains("channel-999"));
    }

    #[test]
    fn missing_connection_record_fails() {
        let snapshot = Snapshot::from_entries(vec![
            chain("cosmoshub", NetworkType::Mainnet, vec![]),
            chain(
                "osmosis",
                NetworkType::Mainnet,
                vec![transfer_asset("ibc/ATOM", "cosmoshub", "uatom", "channel-0", "channel-141")],
            ),
        ]);
        let failures = validate_transfer_channel(&snapshot, "osmosis", osmosis_asset(&snapshot));
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("missing connection registration"));
        assert!(failures[0].contains("cosmoshub-osmosis.json"));
    }

    #[test]
    fn validation_is_symmetric() {
        let channels = vec![transfer_channel("channel-141", "channel-0", None)];
        let snapshot = Snapshot::from_entries(vec![
            chain(
                "cosmoshub",
                NetworkType::Mainnet,
                vec![transfer_asset("ibc/OSMO", "osmosis", "uosmo", "channel-141", "channel-0")],
            ),
            chain("osmosis", NetworkType::Mainnet, vec![Asset {
                base: "uosmo".into(),
                ..Default::default()
            }]),
        ])
        .with_connections(vec![(
            NetworkType::Mainnet,
            connection("cosmoshub", "osmosis", channels),
        )]);
        let asset = snapshot.asset(&AssetId::new("cosmoshub", "ibc/OSMO")).unwrap();
        let failures = validate_transfer_channel(&snapshot, "cosmoshub", asset);
        assert!(failures.is_empty(), "{failures:?}");
    }

    #[test]
    fn multiple_defaults_require_exactly_one_preferred() {
        let ambiguous = fixture(vec![
            transfer_channel("channel-141", "channel-0", None),
            transfer_channel("channel-999", "channel-888", None),
        ]);
        let failures =
            validate_transfer_channel(&ambiguous, "osmosis", osmosis_asset(&ambiguous));
        assert!(failures.iter().any(|m| m.contains("preferred")));

        let resolved = fixture(vec![
            transfer_channel("channel-141", "channel-0", Some(true)),
            transfer_channel("channel-999", "channel-888", None),
        ]);
        let failures = validate_transfer_channel(&resolved, "osmosis", osmosis_asset(&resolved));
        assert!(failures.is_empty(), "{failures:?}");
    }

    #[test]
    fn testnet_defaults_are_not_held_to_the_preferred_rule() {
        let snapshot = Snapshot::from_entries(vec![
            chain("cosmoshubtestnet", NetworkType::Testnet, vec![Asset {
                base: "uatom".into(),
                ..Default::default()
            }]),
            chain(
                "osmosistestnet",
                NetworkType::Testnet,
                vec![transfer_asset(
                    "ibc/ATOM",
                    "cosmoshubtestnet",
                    "uatom",
                    "channel-0",
                    "channel-141",
                )],
            ),
        ])
        .with_connections(vec![(
            NetworkType::Testnet,
            connection(
                "cosmoshubtestnet",
                "osmosistestnet",
                vec![
                    transfer_channel("channel-141", "channel-0", None),
                    transfer_channel("channel-7", "channel-8", None),
                ],
            ),
        )]);
        let asset = snapshot
            .asset(&AssetId::new("osmosistestnet", "ibc/ATOM"))
            .unwrap();
        let failures = validate_transfer_channel(&snapshot, "osmosistestnet", asset);
        assert!(failures.is_empty(), "{failures:?}");
    }

    #[test]
    fn contract_transfer_matches_by_port_and_channel() {
        let wasm_channel = ConnectionChannel {
            chain_1: ChannelEnd {
                channel_id: "channel-2083".into(),
                port_id: "wasm.juno1contract".into(),
            },
            chain_2: ChannelEnd {
                channel_id: "channel-169".into(),
                port_id: TRANSFER_PORT.into(),
            },
            ..Default::default()
        };
        let asset = Asset {
            base: "ibc/CW20HASH".into(),
            traces: vec![Trace {
                trace_type: "ibc-cw20".to_string(),
                counterparty: TraceCounterparty {
                    chain_name: "juno".into(),
                    base_denom: "cw20:juno1token".into(),
                    channel_id: Some("channel-2083".into()),
                    port: Some("wasm.juno1contract".into()),
                },
                chain: Some(TraceChainSide {
                    channel_id: Some("channel-169".into()),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        };
        let snapshot = Snapshot::from_entries(vec![
            chain("juno", NetworkType::Mainnet, vec![Asset {
                base: "cw20:juno1token".into(),
                ..Default::default()
            }]),
            chain("osmosis", NetworkType::Mainnet, vec![asset]),
        ])
        .with_connections(vec![(
            NetworkType::Mainnet,
            connection("juno", "osmosis", vec![wasm_channel]),
        )]);
        let asset = snapshot.asset(&AssetId::new("osmosis", "ibc/CW20HASH")).unwrap();
        let failures = validate_transfer_channel(&snapshot, "osmosis", asset);
        assert!(failures.is_empty(), "{failures:?}");
    }
}

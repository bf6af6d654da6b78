/// Multi-Stage Flow Module
/// Fourth enrichment pass. An account participating in rings of different
/// pattern types is moving money through more than one laundering stage;
/// tag it and order the stages by when the account first touched each
/// pattern's members.
use crate::core::{FraudRing, LaunderingStage, RingPattern};
use crate::graph::{AccountIndex, TransactionGraph};
use indexmap::{IndexMap, IndexSet};

pub const MULTI_STAGE_BONUS: i64 = 20;
pub const ALGO_MULTI_STAGE: &str = "Multi-Stage Flow Detection";

pub struct MultiStageTagger;

impl MultiStageTagger {
    pub fn tag(graph: &TransactionGraph, accounts: &mut AccountIndex, rings: &[FraudRing]) {
        if rings.is_empty() {
            return;
        }

        let rings_by_id: IndexMap<&str, &FraudRing> =
            rings.iter().map(|r| (r.ring_id.as_str(), r)).collect();

        // Global membership per pattern type, for the connection-time lookup.
        let mut members_by_type: IndexMap<RingPattern, IndexSet<&str>> = IndexMap::new();
        for ring in rings {
            members_by_type
                .entry(ring.pattern_type)
                .or_default()
                .extend(ring.members.iter().map(|m| m.as_str()));
        }

        let account_ids: Vec<String> = accounts.keys().cloned().collect();
        for account_id in account_ids {
            let types: Vec<RingPattern> = {
                let record = &accounts[&account_id];
                let mut seen: Vec<RingPattern> = Vec::new();
                for ring_id in &record.ring_ids {
                    if let Some(ring) = rings_by_id.get(ring_id.as_str()) {
                        if !seen.contains(&ring.pattern_type) {
                            seen.push(ring.pattern_type);
                        }
                    }
                }
                seen
            };

            if types.len() < 2 {
                continue;
            }

            // Stable sort by the earliest transaction linking this account
            // to any member of a ring of that type.
            let mut ordered: Vec<(RingPattern, i64)> = types
                .iter()
                .map(|&t| {
                    (
                        t,
                        earliest_connection(graph, &account_id, &members_by_type[&t]),
                    )
                })
                .collect();
            ordered.sort_by_key(|&(_, ts)| ts);

            let flow: Vec<&str> = ordered.iter().map(|(t, _)| t.as_str()).collect();

            let record = accounts.get_mut(&account_id).unwrap();
            record.laundering_stage = Some(LaunderingStage::MultiStage);
            record.flow_pattern = Some(flow.join(" -> "));
            record.apply_adjustment(MULTI_STAGE_BONUS);
            record.add_pattern("multi_stage");
            record.add_algorithm(ALGO_MULTI_STAGE);
            record.explain(&format!(
                "Active across {} laundering stages ({})",
                ordered.len(),
                flow.join(" -> ")
            ));
        }
    }
}

/// Earliest epoch of a transaction touching the account whose counterparty
/// belongs to the given member set; i64::MAX when never connected.
fn earliest_connection(
    graph: &TransactionGraph,
    account_id: &str,
    members: &IndexSet<&str>,
) -> i64 {
    let mut earliest = i64::MAX;
    for &idx in graph.account_txs(account_id) {
        let tx = graph.tx(idx);
        let other = if tx.sender_id == account_id {
            tx.receiver_id.as_str()
        } else {
            tx.sender_id.as_str()
        };
        if members.contains(other) {
            earliest = earliest.min(tx.epoch_seconds());
        }
    }
    earliest
}

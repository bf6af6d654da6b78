/// Fan-In Promotion Module
/// Final pass. Every fan-in receiver enters as an aggregation candidate;
/// a candidate is confirmed when independent evidence corroborates that the
/// aggregated funds were laundered onward. The flag is annotative and never
/// moves the score.
use crate::core::{FanInPromotion, FraudRing, RingPattern};
use crate::graph::{AccountIndex, TransactionGraph};
use crate::modules::fan_in_detector::FanInHit;
use crate::modules::fan_out_detector::FanOutHit;
use crate::modules::shell_chain_detector::ShellChainFindings;
use indexmap::IndexSet;

pub const PRESERVATION_TOLERANCE: f64 = 0.2;
pub const PRESERVATION_MAX_HOPS: usize = 5;
pub const OUTFLOW_WINDOW_SECONDS: i64 = 24 * 3600;
pub const OUTFLOW_MIN_SHARE: f64 = 0.5;

pub struct FanInPromoter;

impl FanInPromoter {
    pub fn promote(
        graph: &TransactionGraph,
        accounts: &mut AccountIndex,
        rings: &[FraudRing],
        fan_ins: &[FanInHit],
        fan_outs: &[FanOutHit],
        shells: &ShellChainFindings,
    ) {
        if fan_ins.is_empty() {
            return;
        }

        let cycle_members: IndexSet<&str> = rings
            .iter()
            .filter(|r| r.pattern_type == RingPattern::Cycle)
            .flat_map(|r| r.members.iter().map(|m| m.as_str()))
            .collect();
        let fan_out_senders: IndexSet<&str> =
            fan_outs.iter().map(|h| h.sender.as_str()).collect();

        for hit in fan_ins {
            let receiver = hit.receiver.as_str();
            let mut reasons: Vec<&'static str> = Vec::new();

            if shell_amount_preserved(graph, shells, receiver, hit.total_received) {
                reasons.push("shell chain amount preservation");
            }

            let in_cycle = cycle_members.contains(receiver);
            if in_cycle
                || graph
                    .out_neighbors(receiver)
                    .any(|n| cycle_members.contains(n))
            {
                reasons.push("cycle ring participation");
            }

            if rapid_outflow(graph, receiver, hit) {
                reasons.push("rapid layered outflow");
            }

            if shells.shell_nodes.contains(receiver)
                || fan_out_senders.contains(receiver)
                || in_cycle
            {
                reasons.push("conflicting network roles");
            }

            if reasons.is_empty() {
                continue;
            }

            if let Some(record) = accounts.get_mut(receiver) {
                if record.fan_in_promotion == FanInPromotion::AggregationCandidate {
                    record.fan_in_promotion = FanInPromotion::ConfirmedMoneyLaundering;
                    record.explain(&format!(
                        "Aggregation confirmed as money laundering ({})",
                        reasons.join(", ")
                    ));
                }
            }
        }
    }
}

/// DFS from the receiver through shell nodes only, up to 5 hops. Holds when
/// some traversed hop edge carries an aggregate amount within +/-20% of what
/// the receiver took in.
fn shell_amount_preserved(
    graph: &TransactionGraph,
    shells: &ShellChainFindings,
    receiver: &str,
    received: f64,
) -> bool {
    if received <= 0.0 {
        return false;
    }

    let mut visited: IndexSet<&str> = IndexSet::new();
    let mut stack: Vec<(&str, usize)> = vec![(receiver, 0)];

    while let Some((node, depth)) = stack.pop() {
        if depth >= PRESERVATION_MAX_HOPS {
            continue;
        }
        for neighbor in graph.out_neighbors(node) {
            if !shells.shell_nodes.contains(neighbor) {
                continue;
            }
            let hop_amount = graph.edge_total_amount(node, neighbor);
            if (hop_amount - received).abs() <= PRESERVATION_TOLERANCE * received {
                return true;
            }
            if visited.insert(neighbor) {
                stack.push((neighbor, depth + 1));
            }
        }
    }

    false
}

/// At least half of the window's received amount leaves within 24 hours of
/// the latest fan-in transaction.
fn rapid_outflow(graph: &TransactionGraph, receiver: &str, hit: &FanInHit) -> bool {
    if hit.total_received <= 0.0 {
        return false;
    }
    let window_close = hit.window_end.and_utc().timestamp();

    let outflow: f64 = graph
        .account_txs(receiver)
        .iter()
        .map(|&i| graph.tx(i))
        .filter(|tx| tx.sender_id == receiver)
        .filter(|tx| {
            let ts = tx.epoch_seconds();
            ts >= window_close && ts - window_close <= OUTFLOW_WINDOW_SECONDS
        })
        .map(|tx| tx.amount)
        .sum();

    outflow >= OUTFLOW_MIN_SHARE * hit.total_received
}

/// Scoring Module
/// Folds detector output into per-account pattern scores, applies the
/// high-degree false-positive dampening, and fixes the human-readable
/// pattern tags, algorithm labels and explanation log.
use crate::core::FanInPromotion;
use crate::graph::{AccountIndex, TransactionGraph};
use crate::modules::fan_in_detector::FanInHit;
use crate::modules::fan_out_detector::FanOutHit;
use crate::modules::shell_chain_detector::ShellChainFindings;
use indexmap::IndexMap;

pub const WEIGHT_CYCLE: u32 = 40;
pub const WEIGHT_FAN_IN: u32 = 30;
pub const WEIGHT_FAN_OUT: u32 = 30;
pub const WEIGHT_SHELL: u32 = 35;
pub const WEIGHT_VELOCITY: u32 = 15;

pub const VELOCITY_PER_DAY_THRESHOLD: f64 = 15.0;

pub const DAMPEN_DEGREE_THRESHOLD: usize = 100;
pub const DAMPEN_INTERVAL_TOLERANCE: f64 = 0.3;
pub const DAMPEN_REGULAR_FRACTION: f64 = 0.6;
pub const DAMPEN_PENALTY: i64 = 30;

pub const ALGO_CYCLE: &str = "Cycle Detection (DFS)";
pub const ALGO_FAN_IN: &str = "Fan-In Smurfing Detection (Sliding Window)";
pub const ALGO_FAN_OUT: &str = "Fan-Out Dispersal Detection (Sliding Window)";
pub const ALGO_SHELL: &str = "Shell Chain Detection (BFS)";
pub const ALGO_VELOCITY: &str = "High Velocity Detection";
pub const ALGO_DAMPENING: &str = "False Positive Dampening";

pub struct Scorer;

impl Scorer {
    pub fn score(
        graph: &TransactionGraph,
        accounts: &mut AccountIndex,
        cycles: &[Vec<String>],
        fan_ins: &[FanInHit],
        fan_outs: &[FanOutHit],
        shells: &ShellChainFindings,
    ) {
        let mut cycle_counts: IndexMap<&str, usize> = IndexMap::new();
        for cycle in cycles {
            for member in cycle {
                *cycle_counts.entry(member.as_str()).or_insert(0) += 1;
            }
        }
        let fan_in_hits: IndexMap<&str, &FanInHit> =
            fan_ins.iter().map(|h| (h.receiver.as_str(), h)).collect();
        let fan_out_hits: IndexMap<&str, &FanOutHit> =
            fan_outs.iter().map(|h| (h.sender.as_str(), h)).collect();

        for (account_id, record) in accounts.iter_mut() {
            if let Some(&count) = cycle_counts.get(account_id.as_str()) {
                record.pattern_scores.cycle = WEIGHT_CYCLE;
                record.add_pattern("cycle");
                record.add_algorithm(ALGO_CYCLE);
                record.explain(&format!(
                    "Participates in {} directed transaction cycle(s)",
                    count
                ));
            }

            if let Some(hit) = fan_in_hits.get(account_id.as_str()) {
                record.pattern_scores.fan_in = WEIGHT_FAN_IN;
                record.add_pattern("fan_in");
                record.add_algorithm(ALGO_FAN_IN);
                record.fan_in_promotion = FanInPromotion::AggregationCandidate;
                record.explain(&format!(
                    "Received funds from {} distinct senders within 72 hours",
                    hit.senders.len()
                ));
            }

            if let Some(hit) = fan_out_hits.get(account_id.as_str()) {
                record.pattern_scores.fan_out = WEIGHT_FAN_OUT;
                record.add_pattern("fan_out");
                record.add_algorithm(ALGO_FAN_OUT);
                record.explain(&format!(
                    "Dispersed funds to {} distinct receivers within 72 hours",
                    hit.receivers.len()
                ));
            }

            if shells.shell_nodes.contains(account_id.as_str()) {
                record.pattern_scores.shell = WEIGHT_SHELL;
                record.add_pattern("shell_chain");
                record.add_algorithm(ALGO_SHELL);
                record.explain("Low-activity intermediary on a shell chain");
            }

            let velocity = transactions_per_day(graph, account_id, record.total_transactions);
            if velocity > VELOCITY_PER_DAY_THRESHOLD {
                record.pattern_scores.velocity = WEIGHT_VELOCITY;
                record.add_pattern("high_velocity");
                record.add_algorithm(ALGO_VELOCITY);
                record.explain(&format!(
                    "High transaction velocity of {:.1} transactions per day",
                    velocity
                ));
            }

            record.recompute_score();

            // High-throughput merchants and payroll accounts transact on a
            // regular cadence; cycle members are never dampened.
            if record.in_degree + record.out_degree > DAMPEN_DEGREE_THRESHOLD
                && !cycle_counts.contains_key(account_id.as_str())
                && has_regular_cadence(graph, account_id)
            {
                record.apply_adjustment(-DAMPEN_PENALTY);
                record.add_algorithm(ALGO_DAMPENING);
                record.explain(
                    "Regular transaction cadence matches a merchant or payroll profile",
                );
            }
        }
    }
}

/// Transactions per day over the account's full activity span, with the
/// span floored at one day.
fn transactions_per_day(graph: &TransactionGraph, account_id: &str, count: usize) -> f64 {
    let txs = graph.account_txs(account_id);
    if txs.is_empty() {
        return 0.0;
    }
    let mut min_ts = i64::MAX;
    let mut max_ts = i64::MIN;
    for &i in txs {
        let ts = graph.tx(i).epoch_seconds();
        min_ts = min_ts.min(ts);
        max_ts = max_ts.max(ts);
    }
    let span_days = (max_ts - min_ts) as f64 / 86_400.0;
    count as f64 / span_days.max(1.0)
}

/// More than 60% of inter-arrival intervals within +/-30% of the mean.
fn has_regular_cadence(graph: &TransactionGraph, account_id: &str) -> bool {
    let mut epochs: Vec<i64> = graph
        .account_txs(account_id)
        .iter()
        .map(|&i| graph.tx(i).epoch_seconds())
        .collect();
    epochs.sort_unstable();

    if epochs.len() < 2 {
        return false;
    }
    let intervals: Vec<f64> = epochs.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
    let mean = intervals.iter().sum::<f64>() / intervals.len() as f64;
    let within = intervals
        .iter()
        .filter(|iv| (**iv - mean).abs() <= DAMPEN_INTERVAL_TOLERANCE * mean)
        .count();

    within as f64 / intervals.len() as f64 > DAMPEN_REGULAR_FRACTION
}

/// Relationship Intelligence Module
/// First enrichment pass. Established counterparty relationships (recurring,
/// long-lived, consistent, periodic) look like rent, salary or supplier
/// traffic; each matched signal walks the score back by a bounded amount.
/// Cycle members are immune, and accounts that were never flagged are left
/// untouched.
use crate::graph::{AccountIndex, TransactionGraph};
use indexmap::{IndexMap, IndexSet};

pub const RECURRING_PAIR_MIN_TXS: usize = 5;
pub const DURATION_MIN_DAYS: f64 = 30.0;
pub const AMOUNT_CONSISTENCY_MIN_TXS: usize = 3;
pub const AMOUNT_CONSISTENCY_MAX_CV: f64 = 0.2;
pub const PERIODICITY_MIN_TXS: usize = 3;
pub const PERIODICITY_MAX_CV: f64 = 0.25;
pub const SIGNAL_ADJUSTMENT: i64 = -5;

pub const ALGO_RELATIONSHIP: &str = "Relationship Intelligence";

pub struct RelationshipIntel;

impl RelationshipIntel {
    pub fn adjust(graph: &TransactionGraph, accounts: &mut AccountIndex) {
        let cycle_members: IndexSet<String> = accounts
            .iter()
            .filter(|(_, rec)| rec.pattern_scores.cycle > 0)
            .map(|(id, _)| id.clone())
            .collect();

        let account_ids: Vec<String> = accounts.keys().cloned().collect();
        for account_id in account_ids {
            if cycle_members.contains(&account_id) {
                continue;
            }
            {
                let record = &accounts[&account_id];
                if !record.is_suspicious {
                    continue;
                }
            }

            let signals = legitimate_signals(graph, &account_id);
            if signals.is_empty() {
                continue;
            }

            let record = accounts.get_mut(&account_id).unwrap();
            record.apply_adjustment(SIGNAL_ADJUSTMENT * signals.len() as i64);
            record.add_algorithm(ALGO_RELATIONSHIP);
            record.explain(&format!(
                "Established counterparty relationships reduce risk ({})",
                signals.join(", ")
            ));
        }
    }
}

/// Matched legitimate-activity signals for one account, at most one entry
/// per signal kind.
fn legitimate_signals(graph: &TransactionGraph, account_id: &str) -> Vec<&'static str> {
    // Directed pair key: counterparty id + direction.
    let mut pairs: IndexMap<(bool, &str), Vec<usize>> = IndexMap::new();
    for &idx in graph.account_txs(account_id) {
        let tx = graph.tx(idx);
        if tx.sender_id == account_id {
            pairs
                .entry((true, tx.receiver_id.as_str()))
                .or_default()
                .push(idx);
        }
        if tx.receiver_id == account_id && !tx.is_self_transfer() {
            pairs
                .entry((false, tx.sender_id.as_str()))
                .or_default()
                .push(idx);
        }
    }

    let mut recurring = false;
    let mut long_lived = false;
    let mut consistent = false;
    let mut periodic = false;

    for indices in pairs.values() {
        let mut epochs: Vec<i64> = indices.iter().map(|&i| graph.tx(i).epoch_seconds()).collect();
        epochs.sort_unstable();
        let amounts: Vec<f64> = indices.iter().map(|&i| graph.tx(i).amount).collect();

        if indices.len() >= RECURRING_PAIR_MIN_TXS {
            recurring = true;
        }

        if let (Some(&first), Some(&last)) = (epochs.first(), epochs.last()) {
            if (last - first) as f64 / 86_400.0 >= DURATION_MIN_DAYS {
                long_lived = true;
            }
        }

        if indices.len() >= AMOUNT_CONSISTENCY_MIN_TXS
            && coefficient_of_variation(&amounts) < AMOUNT_CONSISTENCY_MAX_CV
        {
            consistent = true;
        }

        if indices.len() >= PERIODICITY_MIN_TXS {
            let intervals: Vec<f64> = epochs.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
            if !intervals.is_empty() && coefficient_of_variation(&intervals) < PERIODICITY_MAX_CV {
                periodic = true;
            }
        }
    }

    let mut signals = Vec::new();
    if recurring {
        signals.push("recurring counterparty");
    }
    if long_lived {
        signals.push("long-standing relationship");
    }
    if consistent {
        signals.push("consistent amounts");
    }
    if periodic {
        signals.push("periodic schedule");
    }
    signals
}

fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::INFINITY;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean == 0.0 {
        return f64::INFINITY;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt() / mean
}

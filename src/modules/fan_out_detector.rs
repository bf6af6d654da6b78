/// Fan-Out Dispersal Detection Module
/// Mirror image of fan-in: one sender spraying funds to many distinct
/// receivers inside a 72-hour window, typical of the placement/dispersal leg.
use crate::graph::TransactionGraph;
use crate::modules::fan_in_detector::{FAN_MIN_COUNTERPARTIES, FAN_WINDOW_SECONDS};
use chrono::NaiveDateTime;
use indexmap::IndexMap;

/// One triggered sender. Receiver order is first occurrence inside the
/// triggering window.
#[derive(Debug, Clone)]
pub struct FanOutHit {
    pub sender: String,
    pub receivers: Vec<String>,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    /// Sum of amounts sent inside the triggering window.
    pub total_sent: f64,
}

pub struct FanOutDetector;

impl FanOutDetector {
    pub fn detect(graph: &TransactionGraph) -> Vec<FanOutHit> {
        let mut by_sender: IndexMap<&str, Vec<usize>> = IndexMap::new();
        for (idx, tx) in graph.transactions().iter().enumerate() {
            by_sender.entry(tx.sender_id.as_str()).or_default().push(idx);
        }

        let mut hits = Vec::new();

        for (sender, indices) in by_sender {
            let mut ordered = indices;
            ordered.sort_by_key(|&i| graph.tx(i).epoch_seconds());

            if let Some(hit) = Self::scan_windows(graph, sender, &ordered) {
                hits.push(hit);
            }
        }

        hits
    }

    fn scan_windows(graph: &TransactionGraph, sender: &str, ordered: &[usize]) -> Option<FanOutHit> {
        let mut right = 0;
        for left in 0..ordered.len() {
            let window_open = graph.tx(ordered[left]).epoch_seconds();
            if right < left {
                right = left;
            }
            while right < ordered.len()
                && graph.tx(ordered[right]).epoch_seconds() - window_open <= FAN_WINDOW_SECONDS
            {
                right += 1;
            }

            let window = &ordered[left..right];
            let mut receivers: Vec<String> = Vec::new();
            for &i in window {
                let receiver = &graph.tx(i).receiver_id;
                if !receivers.iter().any(|r| r == receiver) {
                    receivers.push(receiver.clone());
                }
            }

            if receivers.len() >= FAN_MIN_COUNTERPARTIES {
                let total_sent = window.iter().map(|&i| graph.tx(i).amount).sum();
                return Some(FanOutHit {
                    sender: sender.to_string(),
                    receivers,
                    window_start: graph.tx(window[0]).timestamp,
                    window_end: graph.tx(window[window.len() - 1]).timestamp,
                    total_sent,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{parse_timestamp, Transaction};
    use crate::graph::GraphBuilder;

    fn tx(id: &str, from: &str, to: &str, amount: f64, ts: &str) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            sender_id: from.to_string(),
            receiver_id: to.to_string(),
            amount,
            timestamp: parse_timestamp(ts).unwrap(),
        }
    }

    #[test]
    fn test_dispersal_to_eleven_receivers() {
        let txs: Vec<Transaction> = (0..11)
            .map(|i| {
                tx(
                    &format!("T{}", i),
                    "HUB",
                    &format!("R{}", i),
                    500.0,
                    &format!("2024-01-01 {:02}:00:00", i),
                )
            })
            .collect();
        let (graph, _) = GraphBuilder::build(txs);
        let hits = FanOutDetector::detect(&graph);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].sender, "HUB");
        assert_eq!(hits[0].receivers.len(), 11);
        assert_eq!(hits[0].total_sent, 5500.0);
    }

    #[test]
    fn test_repeat_receivers_not_distinct() {
        let txs: Vec<Transaction> = (0..12)
            .map(|i| {
                tx(
                    &format!("T{}", i),
                    "HUB",
                    &format!("R{}", i % 6),
                    500.0,
                    &format!("2024-01-01 {:02}:00:00", i),
                )
            })
            .collect();
        let (graph, _) = GraphBuilder::build(txs);
        assert!(FanOutDetector::detect(&graph).is_empty());
    }
}

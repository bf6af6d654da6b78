/// Fan-In Smurfing Detection Module
/// A receiver collecting from many distinct senders inside a short window is
/// the classic structuring/aggregation signature. Scans each receiver's
/// transactions with a 72-hour two-pointer sliding window and records the
/// first window that triggers.
use crate::graph::TransactionGraph;
use chrono::NaiveDateTime;
use indexmap::IndexMap;

pub const FAN_WINDOW_SECONDS: i64 = 72 * 3600;
pub const FAN_MIN_COUNTERPARTIES: usize = 10;

/// One triggered receiver. Sender order is first occurrence inside the
/// triggering window.
#[derive(Debug, Clone)]
pub struct FanInHit {
    pub receiver: String,
    pub senders: Vec<String>,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    /// Sum of amounts received inside the triggering window.
    pub total_received: f64,
}

pub struct FanInDetector;

impl FanInDetector {
    pub fn detect(graph: &TransactionGraph) -> Vec<FanInHit> {
        // Group transaction indices by receiver, first-appearance order.
        let mut by_receiver: IndexMap<&str, Vec<usize>> = IndexMap::new();
        for (idx, tx) in graph.transactions().iter().enumerate() {
            by_receiver
                .entry(tx.receiver_id.as_str())
                .or_default()
                .push(idx);
        }

        let mut hits = Vec::new();

        for (receiver, indices) in by_receiver {
            let mut ordered = indices;
            // Stable sort keeps input order among equal timestamps.
            ordered.sort_by_key(|&i| graph.tx(i).epoch_seconds());

            if let Some(hit) = Self::scan_windows(graph, receiver, &ordered) {
                hits.push(hit);
            }
        }

        hits
    }

    /// Two-pointer sweep; the boundary is inclusive, so a transaction at
    /// exactly start + 72h belongs to the window. Stops at the first trigger.
    fn scan_windows(graph: &TransactionGraph, receiver: &str, ordered: &[usize]) -> Option<FanInHit> {
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
            let mut senders: Vec<String> = Vec::new();
            for &i in window {
                let sender = &graph.tx(i).sender_id;
                if !senders.iter().any(|s| s == sender) {
                    senders.push(sender.clone());
                }
            }

            if senders.len() >= FAN_MIN_COUNTERPARTIES {
                let total_received = window.iter().map(|&i| graph.tx(i).amount).sum();
                return Some(FanInHit {
                    receiver: receiver.to_string(),
                    senders,
                    window_start: graph.tx(window[0]).timestamp,
                    window_end: graph.tx(window[window.len() - 1]).timestamp,
                    total_received,
                });
            }
        }
        None
    }
}

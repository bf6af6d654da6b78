/// Graph builder - pipeline stage 1
/// Consumes the ordered transaction sequence and produces the transaction
/// graph plus the account index with totals and degrees filled in.
use crate::core::{AccountRecord, Transaction};
use crate::graph::transaction_graph::TransactionGraph;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Account id -> mutable record, insertion-ordered by first observation.
pub type AccountIndex = IndexMap<String, AccountRecord>;

pub struct GraphBuilder;

impl GraphBuilder {
    pub fn build(transactions: Vec<Transaction>) -> (TransactionGraph, AccountIndex) {
        let mut graph = TransactionGraph::new();
        let mut accounts: AccountIndex = IndexMap::new();

        for tx in transactions {
            // Sender observed before receiver, per transaction order.
            accounts
                .entry(tx.sender_id.clone())
                .or_insert_with(|| AccountRecord::new(&tx.sender_id));
            accounts
                .entry(tx.receiver_id.clone())
                .or_insert_with(|| AccountRecord::new(&tx.receiver_id));

            {
                let sender = accounts.get_mut(&tx.sender_id).unwrap();
                sender.total_transactions += 1;
                sender.total_amount_sent += tx.amount;
            }
            {
                let receiver = accounts.get_mut(&tx.receiver_id).unwrap();
                receiver.total_transactions += 1;
                receiver.total_amount_received += tx.amount;
            }

            graph.push_transaction(tx);
        }

        // out_degree = distinct outgoing neighbors
        for (account_id, record) in accounts.iter_mut() {
            record.out_degree = graph.out_neighbor_count(account_id);
        }

        // in_degree = distinct predecessors, one pass over all edges
        let mut predecessors: HashMap<&str, HashSet<&str>> = HashMap::new();
        for (from, to) in graph.edges() {
            predecessors.entry(to).or_default().insert(from);
        }
        let in_degrees: Vec<(String, usize)> = predecessors
            .iter()
            .map(|(to, preds)| (to.to_string(), preds.len()))
            .collect();
        for (to, count) in in_degrees {
            if let Some(record) = accounts.get_mut(&to) {
                record.in_degree = count;
            }
        }

        (graph, accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse_timestamp;

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
    fn test_totals_and_degrees() {
        let (graph, accounts) = GraphBuilder::build(vec![
            tx("T1", "A", "B", 100.0, "2024-01-01 10:00:00"),
            tx("T2", "A", "C", 50.0, "2024-01-01 11:00:00"),
            tx("T3", "B", "C", 25.0, "2024-01-01 12:00:00"),
            tx("T4", "A", "B", 10.0, "2024-01-01 13:00:00"),
        ]);

        assert_eq!(graph.tx_count(), 4);

        let a = &accounts["A"];
        assert_eq!(a.total_transactions, 3);
        assert_eq!(a.out_degree, 2);
        assert_eq!(a.in_degree, 0);
        assert_eq!(a.total_amount_sent, 160.0);
        assert_eq!(a.total_amount_received, 0.0);

        let b = &accounts["B"];
        assert_eq!(b.total_transactions, 3);
        assert_eq!(b.out_degree, 1);
        assert_eq!(b.in_degree, 1);

        let c = &accounts["C"];
        assert_eq!(c.total_transactions, 2);
        assert_eq!(c.in_degree, 2);
        assert_eq!(c.out_degree, 0);
        assert_eq!(c.total_amount_received, 75.0);
    }

    #[test]
    fn test_insertion_order_is_first_observation() {
        let (_, accounts) = GraphBuilder::build(vec![
            tx("T1", "X", "Y", 1.0, "2024-01-01 10:00:00"),
            tx("T2", "Z", "X", 1.0, "2024-01-01 11:00:00"),
        ]);
        let order: Vec<&String> = accounts.keys().collect();
        assert_eq!(order, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_self_transfer_counts_both_roles() {
        let (_, accounts) = GraphBuilder::build(vec![
            tx("T1", "A", "A", 5.0, "2024-01-01 10:00:00"),
        ]);
        let a = &accounts["A"];
        assert_eq!(a.total_transactions, 2);
        assert_eq!(a.total_amount_sent, 5.0);
        assert_eq!(a.total_amount_received, 5.0);
        assert_eq!(a.in_degree, 1);
        assert_eq!(a.out_degree, 1);
    }
}

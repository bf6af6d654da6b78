/// Transaction graph - a directed multigraph over account ids
///
/// Every directed account pair carries the list of transactions between them
/// in input order. Key iteration order is insertion order (first appearance in
/// the input), which is the determinism contract for every traversal the
/// pipeline performs.
use crate::core::Transaction;
use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct TransactionGraph {
    transactions: Vec<Transaction>,
    /// sender -> receiver -> transaction indices in input order
    adjacency: IndexMap<String, IndexMap<String, Vec<usize>>>,
    /// account -> indices of transactions touching it (sender or receiver),
    /// input order, one entry per transaction even for self-transfers
    account_txs: IndexMap<String, Vec<usize>>,
}

impl TransactionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction, wiring the directed edge and per-account lists.
    pub fn push_transaction(&mut self, tx: Transaction) -> usize {
        let idx = self.transactions.len();

        self.account_txs
            .entry(tx.sender_id.clone())
            .or_default()
            .push(idx);
        if !tx.is_self_transfer() {
            self.account_txs
                .entry(tx.receiver_id.clone())
                .or_default()
                .push(idx);
        }

        self.adjacency
            .entry(tx.sender_id.clone())
            .or_default()
            .entry(tx.receiver_id.clone())
            .or_default()
            .push(idx);

        self.transactions.push(tx);
        idx
    }

    pub fn tx(&self, idx: usize) -> &Transaction {
        &self.transactions[idx]
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    /// Outgoing neighbor ids in first-edge-appearance order.
    pub fn out_neighbors(&self, account_id: &str) -> impl Iterator<Item = &str> {
        self.adjacency
            .get(account_id)
            .into_iter()
            .flat_map(|nbrs| nbrs.keys().map(|k| k.as_str()))
    }

    pub fn out_neighbor_count(&self, account_id: &str) -> usize {
        self.adjacency.get(account_id).map_or(0, |nbrs| nbrs.len())
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.adjacency
            .get(from)
            .is_some_and(|nbrs| nbrs.contains_key(to))
    }

    /// Transaction indices on a directed edge, input order.
    pub fn edge_txs(&self, from: &str, to: &str) -> &[usize] {
        self.adjacency
            .get(from)
            .and_then(|nbrs| nbrs.get(to))
            .map_or(&[], |v| v.as_slice())
    }

    /// First (input-order) transaction on a directed edge.
    pub fn edge_first_tx(&self, from: &str, to: &str) -> Option<&Transaction> {
        self.edge_txs(from, to).first().map(|&i| self.tx(i))
    }

    /// Earliest-timestamp transaction on a directed edge; input order breaks
    /// timestamp ties.
    pub fn edge_earliest_tx(&self, from: &str, to: &str) -> Option<&Transaction> {
        self.edge_txs(from, to)
            .iter()
            .map(|&i| self.tx(i))
            .min_by_key(|tx| tx.epoch_seconds())
    }

    /// Sum of amounts on a directed edge.
    pub fn edge_total_amount(&self, from: &str, to: &str) -> f64 {
        self.edge_txs(from, to).iter().map(|&i| self.tx(i).amount).sum()
    }

    /// Indices of transactions touching an account, input order.
    pub fn account_txs(&self, account_id: &str) -> &[usize] {
        self.account_txs
            .get(account_id)
            .map_or(&[], |v| v.as_slice())
    }

    /// Sender ids that have at least one outgoing edge, insertion order.
    pub fn senders(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(|k| k.as_str())
    }

    /// All directed edges as (from, to) pairs, insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.adjacency.iter().flat_map(|(from, nbrs)| {
            nbrs.keys().map(move |to| (from.as_str(), to.as_str()))
        })
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
    fn test_edge_preserves_input_order() {
        let mut graph = TransactionGraph::new();
        graph.push_transaction(tx("T1", "A", "B", 100.0, "2024-01-01 10:00:00"));
        graph.push_transaction(tx("T2", "A", "B", 50.0, "2024-01-01 09:00:00"));

        let first = graph.edge_first_tx("A", "B").unwrap();
        assert_eq!(first.transaction_id, "T1");

        let earliest = graph.edge_earliest_tx("A", "B").unwrap();
        assert_eq!(earliest.transaction_id, "T2");

        assert_eq!(graph.edge_total_amount("A", "B"), 150.0);
    }

    #[test]
    fn test_neighbor_insertion_order() {
        let mut graph = TransactionGraph::new();
        graph.push_transaction(tx("T1", "A", "C", 10.0, "2024-01-01 10:00:00"));
        graph.push_transaction(tx("T2", "A", "B", 10.0, "2024-01-01 11:00:00"));
        graph.push_transaction(tx("T3", "A", "C", 10.0, "2024-01-01 12:00:00"));

        let neighbors: Vec<&str> = graph.out_neighbors("A").collect();
        assert_eq!(neighbors, vec!["C", "B"]);
        assert_eq!(graph.out_neighbor_count("A"), 2);
    }

    #[test]
    fn test_self_transfer_touches_account_once() {
        let mut graph = TransactionGraph::new();
        graph.push_transaction(tx("T1", "A", "A", 10.0, "2024-01-01 10:00:00"));
        assert_eq!(graph.account_txs("A").len(), 1);
        assert!(graph.has_edge("A", "A"));
    }
}

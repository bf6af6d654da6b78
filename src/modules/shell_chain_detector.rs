/// Shell Chain Detection Module
/// Finds directed corridors of at least 3 hops whose intermediate accounts
/// are shells (3 or fewer total transactions). Funds layered through such
/// low-activity pass-through accounts are a strong laundering signal.
use crate::graph::{AccountIndex, TransactionGraph};
use indexmap::IndexSet;
use std::collections::VecDeque;

pub const SHELL_MAX_TRANSACTIONS: usize = 3;
pub const SHELL_MIN_HOPS: usize = 3;
pub const SHELL_MAX_HOPS: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct ShellChainFindings {
    /// Every qualifying path, discovery order. Collapsed into at most one
    /// ring per connected component at ring-building time.
    pub chains: Vec<Vec<String>>,
    /// Accounts marked as shell intermediaries on at least one chain.
    pub shell_nodes: IndexSet<String>,
}

pub struct ShellChainDetector;

impl ShellChainDetector {
    pub fn detect(graph: &TransactionGraph, accounts: &AccountIndex) -> ShellChainFindings {
        let mut findings = ShellChainFindings::default();

        for start in accounts.keys() {
            Self::bfs_from(graph, accounts, start, &mut findings);
        }

        findings
    }

    /// BFS over outgoing edges. Any node can terminate a path, but the search
    /// only grows through shell nodes, so chains extend along low-activity
    /// corridors and stop one hop after leaving them.
    fn bfs_from(
        graph: &TransactionGraph,
        accounts: &AccountIndex,
        start: &str,
        findings: &mut ShellChainFindings,
    ) {
        let mut queue: VecDeque<Vec<String>> = VecDeque::new();
        queue.push_back(vec![start.to_string()]);

        while let Some(path) = queue.pop_front() {
            let current = path.last().unwrap();

            for neighbor in graph.out_neighbors(current) {
                if path.iter().any(|p| p == neighbor) {
                    continue;
                }

                let mut next = path.clone();
                next.push(neighbor.to_string());
                let hops = next.len() - 1;

                if hops >= SHELL_MIN_HOPS && Self::intermediates_are_shells(accounts, &next) {
                    for mid in &next[1..next.len() - 1] {
                        findings.shell_nodes.insert(mid.clone());
                    }
                    findings.chains.push(next.clone());
                }

                if hops < SHELL_MAX_HOPS && is_shell(accounts, neighbor) {
                    queue.push_back(next);
                }
            }
        }
    }

    fn intermediates_are_shells(accounts: &AccountIndex, path: &[String]) -> bool {
        path[1..path.len() - 1]
            .iter()
            .all(|mid| is_shell(accounts, mid))
    }
}

pub fn is_shell(accounts: &AccountIndex, account_id: &str) -> bool {
    accounts
        .get(account_id)
        .is_some_and(|rec| rec.total_transactions <= SHELL_MAX_TRANSACTIONS)
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

    /// X -> S1 -> S2 -> S3 -> Y with busy endpoints and quiet intermediates.
    fn corridor() -> Vec<Transaction> {
        vec![
            tx("T1", "X", "S1", 900.0, "2024-01-01 10:00:00"),
            tx("T2", "S1", "S2", 890.0, "2024-01-01 11:00:00"),
            tx("T3", "S2", "S3", 880.0, "2024-01-01 12:00:00"),
            tx("T4", "S3", "Y", 870.0, "2024-01-01 13:00:00"),
            // Endpoint traffic so X and Y are not shells themselves.
            tx("T5", "X", "M1", 10.0, "2024-01-02 10:00:00"),
            tx("T6", "X", "M2", 10.0, "2024-01-02 11:00:00"),
            tx("T7", "X", "M3", 10.0, "2024-01-02 12:00:00"),
            tx("T8", "M1", "Y", 10.0, "2024-01-03 10:00:00"),
            tx("T9", "M2", "Y", 10.0, "2024-01-03 11:00:00"),
            tx("T10", "M3", "Y", 10.0, "2024-01-03 12:00:00"),
        ]
    }

    #[test]
    fn test_corridor_detected_and_intermediates_marked() {
        let (graph, accounts) = GraphBuilder::build(corridor());
        let findings = ShellChainDetector::detect(&graph, &accounts);

        assert!(findings
            .chains
            .iter()
            .any(|c| c == &["X", "S1", "S2", "S3", "Y"]));
        for shell in ["S1", "S2", "S3"] {
            assert!(findings.shell_nodes.contains(shell), "{} not marked", shell);
        }
        assert!(!findings.shell_nodes.contains("X"));
        assert!(!findings.shell_nodes.contains("Y"));
    }

    #[test]
    fn test_busy_intermediate_breaks_chain() {
        let mut txs = corridor();
        // Push S2 above the shell threshold.
        for i in 0..4 {
            txs.push(tx(
                &format!("B{}", i),
                "S2",
                &format!("N{}", i),
                1.0,
                &format!("2024-02-01 {:02}:00:00", i),
            ));
        }
        let (graph, accounts) = GraphBuilder::build(txs);
        let findings = ShellChainDetector::detect(&graph, &accounts);
        assert!(!findings
            .chains
            .iter()
            .any(|c| c == &["X", "S1", "S2", "S3", "Y"]));
    }

    #[test]
    fn test_two_hop_path_not_a_chain() {
        let txs = vec![
            tx("T1", "X", "S1", 100.0, "2024-01-01 10:00:00"),
            tx("T2", "S1", "Y", 95.0, "2024-01-01 11:00:00"),
        ];
        let (graph, accounts) = GraphBuilder::build(txs);
        let findings = ShellChainDetector::detect(&graph, &accounts);
        assert!(findings.chains.is_empty());
    }

    #[test]
    fn test_shell_threshold_is_three() {
        let (_, accounts) = GraphBuilder::build(vec![
            tx("T1", "A", "S", 1.0, "2024-01-01 10:00:00"),
            tx("T2", "S", "B", 1.0, "2024-01-01 11:00:00"),
            tx("T3", "S", "C", 1.0, "2024-01-01 12:00:00"),
        ]);
        assert!(is_shell(&accounts, "S"));

        let (_, accounts) = GraphBuilder::build(vec![
            tx("T1", "A", "S", 1.0, "2024-01-01 10:00:00"),
            tx("T2", "S", "B", 1.0, "2024-01-01 11:00:00"),
            tx("T3", "S", "C", 1.0, "2024-01-01 12:00:00"),
            tx("T4", "S", "D", 1.0, "2024-01-01 13:00:00"),
        ]);
        assert!(!is_shell(&accounts, "S"));
    }
}

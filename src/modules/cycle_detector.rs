/// Cycle Detection Module
/// Enumerates simple directed cycles of length 3 to 5, the classic layering
/// loop where funds return to their origin through a short chain of mules.
use crate::graph::{AccountIndex, TransactionGraph};
use std::collections::HashSet;

pub const MIN_CYCLE_LEN: usize = 3;
pub const MAX_CYCLE_LEN: usize = 5;

pub struct CycleDetector;

impl CycleDetector {
    /// Bounded DFS from every account in insertion order. Cycles are
    /// deduplicated by their ascending-sorted member signature; the first
    /// discovered orientation is the retained representative.
    pub fn detect(graph: &TransactionGraph, accounts: &AccountIndex) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for start in accounts.keys() {
            let mut path = vec![start.clone()];
            Self::dfs(graph, start, start, &mut path, &mut seen, &mut cycles);
        }

        cycles
    }

    fn dfs(
        graph: &TransactionGraph,
        start: &str,
        current: &str,
        path: &mut Vec<String>,
        seen: &mut HashSet<String>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        for neighbor in graph.out_neighbors(current) {
            if neighbor == start {
                if (MIN_CYCLE_LEN..=MAX_CYCLE_LEN).contains(&path.len()) {
                    let signature = cycle_signature(path);
                    if seen.insert(signature) {
                        cycles.push(path.clone());
                    }
                }
            } else if path.len() < MAX_CYCLE_LEN && !path.iter().any(|p| p == neighbor) {
                path.push(neighbor.to_string());
                Self::dfs(graph, start, neighbor, path, seen, cycles);
                path.pop();
            }
        }
    }
}

/// Sorted node-set signature: two traversals of the same cycle collapse.
fn cycle_signature(path: &[String]) -> String {
    let mut ids: Vec<&str> = path.iter().map(|s| s.as_str()).collect();
    ids.sort_unstable();
    ids.join("|")
}

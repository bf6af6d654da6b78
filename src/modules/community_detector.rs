/// Mule Community Detection Module
/// Network-level pass over the suspicious subgraph. Connected components
/// backed by at least two distinct evidence categories become community
/// rings that subsume the overlapping pattern rings on their members. The
/// pattern rings stay in the global output as the audit trail.
use crate::core::{community_ring_id, FraudRing, RingPattern};
use crate::graph::{connected_components, AccountIndex, TransactionGraph};
use indexmap::{IndexMap, IndexSet};

pub const MIN_COMMUNITY_SIZE: usize = 2;
pub const MIN_EVIDENCE_CATEGORIES: usize = 2;
pub const BRIDGE_MIN_DEGREE: usize = 2;

pub const ALGO_COMMUNITY: &str = "Mule Community Detection (BFS Components)";

pub struct CommunityDetector;

impl CommunityDetector {
    /// Appends accepted community rings, rewires member ring ids, then
    /// re-sorts the full ring list by risk score (stable).
    pub fn detect(
        graph: &TransactionGraph,
        accounts: &mut AccountIndex,
        rings: &mut Vec<FraudRing>,
    ) {
        let suspicious: Vec<String> = accounts
            .iter()
            .filter(|(_, rec)| rec.is_suspicious)
            .map(|(id, _)| id.clone())
            .collect();

        // Undirected projection of the suspicious subgraph.
        let mut adjacency: IndexMap<String, Vec<String>> =
            suspicious.iter().map(|id| (id.clone(), Vec::new())).collect();
        for (from, to) in graph.edges() {
            if from == to || !adjacency.contains_key(from) || !adjacency.contains_key(to) {
                continue;
            }
            if !adjacency[from].iter().any(|n| n == to) {
                adjacency.get_mut(from).unwrap().push(to.to_string());
            }
            if !adjacency[to].iter().any(|n| n == from) {
                adjacency.get_mut(to).unwrap().push(from.to_string());
            }
        }

        let mut next_seq = 0usize;
        let mut accepted = Vec::new();

        for component in connected_components(&suspicious, &adjacency) {
            if component.len() < MIN_COMMUNITY_SIZE {
                continue;
            }
            let evidence = evidence_categories(graph, accounts, &adjacency, &component);
            if evidence.len() < MIN_EVIDENCE_CATEGORIES {
                continue;
            }

            next_seq += 1;
            let ring_id = community_ring_id(next_seq);

            let mean_score = component
                .iter()
                .map(|m| accounts[m].suspicion_score as f64)
                .sum::<f64>()
                / component.len() as f64;
            let size_boost = ((component.len() + 1) as f64).log2() * 10.0;
            let risk_score = (mean_score + size_boost).round().min(100.0) as u32;

            let total_value = component_edge_value(graph, &component);

            let subsumed: IndexSet<String> = component
                .iter()
                .flat_map(|m| accounts[m].ring_ids.iter().cloned())
                .collect();

            for member in &component {
                let record = accounts.get_mut(member).unwrap();
                for old_id in &subsumed {
                    record.remove_ring(old_id);
                }
                record.add_ring(&ring_id);
                record.add_pattern("community");
                record.add_algorithm(ALGO_COMMUNITY);
                record.explain(&format!(
                    "Member of mule community {} spanning {} accounts",
                    ring_id,
                    component.len()
                ));
            }

            accepted.push(FraudRing {
                ring_id,
                pattern_type: RingPattern::Community,
                member_count: component.len(),
                risk_score,
                total_value,
                explanation: format!(
                    "Connected community of {} suspicious accounts with {} evidence categories ({})",
                    component.len(),
                    evidence.len(),
                    evidence.join(", ")
                ),
                members: component,
            });
        }

        rings.extend(accepted);
        rings.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
    }
}

/// Distinct evidence categories present in a component.
fn evidence_categories(
    graph: &TransactionGraph,
    accounts: &AccountIndex,
    adjacency: &IndexMap<String, Vec<String>>,
    component: &[String],
) -> Vec<&'static str> {
    let mut categories = Vec::new();

    if component.iter().any(|m| accounts[m].pattern_scores.cycle > 0) {
        categories.push("cycle member");
    }
    if component.iter().any(|m| accounts[m].pattern_scores.fan_in > 0) {
        categories.push("fan-in hub");
    }
    if component.iter().any(|m| accounts[m].pattern_scores.fan_out > 0) {
        categories.push("fan-out hub");
    }
    if component.iter().any(|m| accounts[m].pattern_scores.shell > 0) {
        categories.push("shell intermediary");
    }
    if component
        .iter()
        .any(|m| adjacency.get(m).is_some_and(|n| n.len() >= BRIDGE_MIN_DEGREE))
    {
        categories.push("bridge node");
    }
    if directed_edge_count(graph, component) >= component.len() {
        categories.push("dense flows");
    }

    categories
}

/// Distinct directed edges with both endpoints inside the component.
fn directed_edge_count(graph: &TransactionGraph, component: &[String]) -> usize {
    let members: IndexSet<&str> = component.iter().map(|m| m.as_str()).collect();
    graph
        .edges()
        .filter(|(from, to)| members.contains(from) && members.contains(to))
        .count()
}

/// Sum of amounts on every in-component directed edge.
fn component_edge_value(graph: &TransactionGraph, component: &[String]) -> f64 {
    let members: IndexSet<&str> = component.iter().map(|m| m.as_str()).collect();
    let mut total = 0.0;
    for (from, to) in graph.edges() {
        if members.contains(from) && members.contains(to) {
            total += graph.edge_total_amount(from, to);
        }
    }
    total
}

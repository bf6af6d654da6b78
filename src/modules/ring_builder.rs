/// Ring Builder Module
/// Materializes ring objects from detector output in a fixed emission order
/// (cycles, fan-ins, fan-outs, shell components) so that ids from the shared
/// monotonic counter are reproducible run to run.
use crate::core::{pattern_ring_id, FraudRing, RingPattern};
use crate::graph::{connected_components, AccountIndex, TransactionGraph};
use crate::modules::fan_in_detector::FanInHit;
use crate::modules::fan_out_detector::FanOutHit;
use crate::modules::shell_chain_detector::ShellChainFindings;
use indexmap::IndexMap;

pub struct RingBuilder;

impl RingBuilder {
    pub fn build(
        graph: &TransactionGraph,
        accounts: &mut AccountIndex,
        cycles: &[Vec<String>],
        fan_ins: &[FanInHit],
        fan_outs: &[FanOutHit],
        shells: &ShellChainFindings,
    ) -> Vec<FraudRing> {
        let mut rings = Vec::new();
        let mut next_id = 0usize;
        let mut take_id = move || {
            next_id += 1;
            pattern_ring_id(next_id)
        };

        for cycle in cycles {
            let total_value = cycle_hop_value(graph, cycle);
            let ring = FraudRing {
                ring_id: take_id(),
                pattern_type: RingPattern::Cycle,
                member_count: cycle.len(),
                risk_score: mean_member_score(accounts, cycle),
                total_value,
                explanation: format!(
                    "Funds loop through {} accounts and return to the origin",
                    cycle.len()
                ),
                members: cycle.clone(),
            };
            attach(accounts, &ring);
            rings.push(ring);
        }

        for hit in fan_ins {
            let mut members = vec![hit.receiver.clone()];
            members.extend(hit.senders.iter().cloned());
            let ring = FraudRing {
                ring_id: take_id(),
                pattern_type: RingPattern::FanIn,
                member_count: members.len(),
                risk_score: mean_member_score(accounts, &members),
                total_value: 0.0,
                explanation: format!(
                    "{} distinct senders funneled funds into {} within 72 hours",
                    hit.senders.len(),
                    hit.receiver
                ),
                members,
            };
            attach(accounts, &ring);
            rings.push(ring);
        }

        for hit in fan_outs {
            let mut members = vec![hit.sender.clone()];
            members.extend(hit.receivers.iter().cloned());
            let ring = FraudRing {
                ring_id: take_id(),
                pattern_type: RingPattern::FanOut,
                member_count: members.len(),
                risk_score: mean_member_score(accounts, &members),
                total_value: 0.0,
                explanation: format!(
                    "{} dispersed funds to {} distinct receivers within 72 hours",
                    hit.sender,
                    hit.receivers.len()
                ),
                members,
            };
            attach(accounts, &ring);
            rings.push(ring);
        }

        for chain in collapse_chains(shells) {
            let total_value = chain_edge_value(graph, &chain);
            let ring = FraudRing {
                ring_id: take_id(),
                pattern_type: RingPattern::ShellChain,
                member_count: chain.len(),
                risk_score: mean_member_score(accounts, &chain),
                total_value,
                explanation: format!(
                    "Funds layered through {} low-activity shell accounts",
                    chain.len().saturating_sub(2)
                ),
                members: chain,
            };
            attach(accounts, &ring);
            rings.push(ring);
        }

        rings
    }
}

fn attach(accounts: &mut AccountIndex, ring: &FraudRing) {
    for member in &ring.members {
        if let Some(record) = accounts.get_mut(member) {
            record.add_ring(&ring.ring_id);
        }
    }
}

/// Rounded mean of the members' current suspicion scores.
fn mean_member_score(accounts: &AccountIndex, members: &[String]) -> u32 {
    if members.is_empty() {
        return 0;
    }
    let sum: u64 = members
        .iter()
        .filter_map(|m| accounts.get(m))
        .map(|rec| rec.suspicion_score as u64)
        .sum();
    ((sum as f64) / (members.len() as f64)).round() as u32
}

/// Sum of the first transaction on each hop edge around the cycle.
fn cycle_hop_value(graph: &TransactionGraph, cycle: &[String]) -> f64 {
    let mut total = 0.0;
    for i in 0..cycle.len() {
        let from = &cycle[i];
        let to = &cycle[(i + 1) % cycle.len()];
        if let Some(tx) = graph.edge_first_tx(from, to) {
            total += tx.amount;
        }
    }
    total
}

/// Sum of every transaction on the chain's consecutive hop edges.
fn chain_edge_value(graph: &TransactionGraph, chain: &[String]) -> f64 {
    chain
        .windows(2)
        .map(|hop| graph.edge_total_amount(&hop[0], &hop[1]))
        .sum()
}

/// At most one ring per connected component of the chain-union graph,
/// represented by the chain with the most unique nodes; discovery order
/// breaks ties.
fn collapse_chains(shells: &ShellChainFindings) -> Vec<Vec<String>> {
    if shells.chains.is_empty() {
        return Vec::new();
    }

    // Undirected union of all chain edges, node order = first appearance.
    let mut nodes: Vec<String> = Vec::new();
    let mut adjacency: IndexMap<String, Vec<String>> = IndexMap::new();
    for chain in &shells.chains {
        for node in chain {
            if !adjacency.contains_key(node) {
                adjacency.insert(node.clone(), Vec::new());
                nodes.push(node.clone());
            }
        }
        for hop in chain.windows(2) {
            let (a, b) = (&hop[0], &hop[1]);
            if !adjacency[a].iter().any(|n| n == b) {
                adjacency.get_mut(a).unwrap().push(b.clone());
            }
            if !adjacency[b].iter().any(|n| n == a) {
                adjacency.get_mut(b).unwrap().push(a.clone());
            }
        }
    }

    let components = connected_components(&nodes, &adjacency);
    let component_of: IndexMap<&str, usize> = components
        .iter()
        .enumerate()
        .flat_map(|(ci, comp)| comp.iter().map(move |n| (n.as_str(), ci)))
        .collect();

    let mut best_per_component: Vec<Option<&Vec<String>>> = vec![None; components.len()];
    for chain in &shells.chains {
        let ci = component_of[chain[0].as_str()];
        match best_per_component[ci] {
            Some(best) if best.len() >= chain.len() => {}
            _ => best_per_component[ci] = Some(chain),
        }
    }

    best_per_component
        .into_iter()
        .flatten()
        .cloned()
        .collect()
}

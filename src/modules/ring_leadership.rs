/// Ring Leadership Module
/// Third enrichment pass. Ranks each ring's members by betweenness
/// centrality over the ring-local edge set and assigns orchestrator,
/// intermediary and peripheral roles. The orchestrator picks up a +10 score
/// bonus.
use crate::core::{FraudRing, RingRole};
use crate::graph::{brandes_betweenness, AccountIndex, TransactionGraph};
use indexmap::IndexMap;

pub const ORCHESTRATOR_BONUS: i64 = 10;
pub const CENTRALITY_FLOOR: f64 = 1e-9;
pub const INTERMEDIARY_SHARE: f64 = 0.66;
pub const SMALL_RING_SIZE: usize = 3;

pub struct RingLeadership;

impl RingLeadership {
    pub fn assign(graph: &TransactionGraph, accounts: &mut AccountIndex, rings: &[FraudRing]) {
        for ring in rings {
            if ring.member_count < 2 {
                continue;
            }
            Self::assign_ring(graph, accounts, ring);
        }
    }

    fn assign_ring(graph: &TransactionGraph, accounts: &mut AccountIndex, ring: &FraudRing) {
        // Ring-local directed edges: distinct hops observed among members.
        let mut adjacency: IndexMap<String, Vec<String>> = IndexMap::new();
        for from in &ring.members {
            let targets: Vec<String> = ring
                .members
                .iter()
                .filter(|to| *to != from && graph.has_edge(from, to))
                .cloned()
                .collect();
            adjacency.insert(from.clone(), targets);
        }

        let centrality = brandes_betweenness(&ring.members, &adjacency);
        let max = centrality
            .values()
            .fold(0.0f64, |acc, &c| acc.max(c))
            .max(CENTRALITY_FLOOR);

        // Stable sort: equal centralities keep ring member order, so a ring
        // with no internal paths still ranks its first member at the top.
        let mut ranked: Vec<(&String, f64)> = ring
            .members
            .iter()
            .map(|m| (m, centrality.get(m).copied().unwrap_or(0.0) / max))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let size = ranked.len();
        for (rank, (member, score)) in ranked.into_iter().enumerate() {
            let role = if rank == 0 {
                RingRole::Orchestrator
            } else if size <= SMALL_RING_SIZE {
                RingRole::Peripheral
            } else if (rank as f64) < (size as f64) * INTERMEDIARY_SHARE {
                RingRole::Intermediary
            } else {
                RingRole::Peripheral
            };

            if let Some(record) = accounts.get_mut(member) {
                if score > record.centrality_score {
                    record.centrality_score = score;
                }
                record.upgrade_role(role);
                if role == RingRole::Orchestrator {
                    record.apply_adjustment(ORCHESTRATOR_BONUS);
                    record.explain(&format!(
                        "Identified as the orchestrator of {}",
                        ring.ring_id
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{parse_timestamp, RingPattern, Transaction};
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

    fn ring(id: &str, pattern: RingPattern, members: &[&str]) -> FraudRing {
        FraudRing {
            ring_id: id.to_string(),
            pattern_type: pattern,
            members: members.iter().map(|s| s.to_string()).collect(),
            member_count: members.len(),
            risk_score: 50,
            total_value: 0.0,
            explanation: String::new(),
        }
    }

    #[test]
    fn test_hub_becomes_orchestrator() {
        // B sits between everything: A -> B -> C, A -> B -> D, C -> D.
        let (graph, mut accounts) = GraphBuilder::build(vec![
            tx("T1", "A", "B", 1.0, "2024-01-01 10:00:00"),
            tx("T2", "B", "C", 1.0, "2024-01-01 11:00:00"),
            tx("T3", "B", "D", 1.0, "2024-01-01 12:00:00"),
            tx("T4", "C", "D", 1.0, "2024-01-01 13:00:00"),
        ]);
        for rec in accounts.values_mut() {
            rec.pattern_scores.shell = 35;
            rec.recompute_score();
        }
        let rings = vec![ring("RING_001", RingPattern::ShellChain, &["A", "B", "C", "D"])];
        RingLeadership::assign(&graph, &mut accounts, &rings);

        assert_eq!(accounts["B"].ring_role, Some(RingRole::Orchestrator));
        assert_eq!(accounts["B"].centrality_score, 1.0);
        assert_eq!(accounts["B"].suspicion_score, 45);
        // Four members: ranks 1 and 2 are intermediaries, rank 3 peripheral.
        let roles: Vec<Option<RingRole>> = ["A", "C", "D"]
            .iter()
            .map(|id| accounts[*id].ring_role)
            .collect();
        assert!(roles.contains(&Some(RingRole::Peripheral)));
    }

    #[test]
    fn test_small_ring_rest_is_peripheral() {
        let (graph, mut accounts) = GraphBuilder::build(vec![
            tx("T1", "A", "B", 1.0, "2024-01-01 10:00:00"),
            tx("T2", "B", "C", 1.0, "2024-01-01 11:00:00"),
            tx("T3", "C", "A", 1.0, "2024-01-01 12:00:00"),
        ]);
        let rings = vec![ring("RING_001", RingPattern::Cycle, &["A", "B", "C"])];
        RingLeadership::assign(&graph, &mut accounts, &rings);

        // Symmetric cycle: every centrality ties, the first member in ring
        // order ranks first.
        assert_eq!(accounts["A"].ring_role, Some(RingRole::Orchestrator));
        assert_eq!(accounts["B"].ring_role, Some(RingRole::Peripheral));
        assert_eq!(accounts["C"].ring_role, Some(RingRole::Peripheral));
    }

    #[test]
    fn test_no_internal_edges_defaults_to_first_member() {
        // Fan-in ring: senders never transact among themselves.
        let (graph, mut accounts) = GraphBuilder::build(vec![
            tx("T1", "S1", "R", 1.0, "2024-01-01 10:00:00"),
            tx("T2", "S2", "R", 1.0, "2024-01-01 11:00:00"),
        ]);
        let rings = vec![ring("RING_001", RingPattern::FanIn, &["R", "S1", "S2"])];
        RingLeadership::assign(&graph, &mut accounts, &rings);
        assert_eq!(accounts["R"].ring_role, Some(RingRole::Orchestrator));
    }

    #[test]
    fn test_orchestrator_bonus_capped() {
        let (graph, mut accounts) = GraphBuilder::build(vec![
            tx("T1", "A", "B", 1.0, "2024-01-01 10:00:00"),
            tx("T2", "B", "C", 1.0, "2024-01-01 11:00:00"),
            tx("T3", "C", "A", 1.0, "2024-01-01 12:00:00"),
        ]);
        {
            let a = accounts.get_mut("A").unwrap();
            a.pattern_scores.cycle = 40;
            a.pattern_scores.shell = 35;
            a.pattern_scores.fan_in = 30;
            a.recompute_score();
            assert_eq!(a.suspicion_score, 100);
        }
        let rings = vec![ring("RING_001", RingPattern::Cycle, &["A", "B", "C"])];
        RingLeadership::assign(&graph, &mut accounts, &rings);
        assert_eq!(accounts["A"].suspicion_score, 100);
    }
}

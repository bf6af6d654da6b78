/// Temporal Cycle Validation Module
/// Second enrichment pass. A real laundering loop moves money forward in
/// time and cannot shed more than half its value per hop. Cycle rings whose
/// earliest hop transactions violate either rule are removed, and members
/// left without any surviving cycle ring lose their cycle contribution.
use crate::core::{FraudRing, RingPattern};
use crate::graph::{AccountIndex, TransactionGraph};
use indexmap::IndexSet;

pub const AMOUNT_CONTINUITY_RATIO: f64 = 0.5;

pub struct TemporalValidator;

impl TemporalValidator {
    /// Returns the number of cycle rings removed.
    pub fn validate(
        graph: &TransactionGraph,
        accounts: &mut AccountIndex,
        rings: &mut Vec<FraudRing>,
    ) -> usize {
        let mut removed_ids: IndexSet<String> = IndexSet::new();
        let mut affected: IndexSet<String> = IndexSet::new();

        for ring in rings.iter() {
            if ring.pattern_type != RingPattern::Cycle {
                continue;
            }
            if !Self::is_plausible(graph, &ring.members) {
                removed_ids.insert(ring.ring_id.clone());
                for member in &ring.members {
                    affected.insert(member.clone());
                }
            }
        }

        if removed_ids.is_empty() {
            return 0;
        }

        rings.retain(|ring| !removed_ids.contains(&ring.ring_id));

        // Members keep their cycle contribution only while some surviving
        // cycle ring still contains them.
        let surviving_cycle_members: IndexSet<&str> = rings
            .iter()
            .filter(|r| r.pattern_type == RingPattern::Cycle)
            .flat_map(|r| r.members.iter().map(|m| m.as_str()))
            .collect();

        for member in &affected {
            if let Some(record) = accounts.get_mut(member) {
                for ring_id in &removed_ids {
                    record.remove_ring(ring_id);
                }
                if !surviving_cycle_members.contains(member.as_str()) {
                    record.pattern_scores.cycle = 0;
                    record.remove_pattern("cycle");
                    record.recompute_score();
                    record.explain("Cycle participation discarded after temporal validation");
                }
            }
        }

        removed_ids.len()
    }

    /// Both rules over the earliest transaction on each hop edge:
    /// timestamps non-decreasing around the cycle, and each hop carrying at
    /// least half the previous hop's amount.
    fn is_plausible(graph: &TransactionGraph, members: &[String]) -> bool {
        let mut hops = Vec::with_capacity(members.len());
        for i in 0..members.len() {
            let from = &members[i];
            let to = &members[(i + 1) % members.len()];
            match graph.edge_earliest_tx(from, to) {
                Some(tx) => hops.push(tx),
                None => return false,
            }
        }

        for pair in hops.windows(2) {
            if pair[1].epoch_seconds() < pair[0].epoch_seconds() {
                return false;
            }
            if pair[1].amount < AMOUNT_CONTINUITY_RATIO * pair[0].amount {
                return false;
            }
        }

        true
    }
}

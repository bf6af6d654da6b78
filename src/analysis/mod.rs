/// Analysis engine orchestrating the detection pipeline
///
/// Runs the nine stages in fixed order over shared account state: graph
/// construction, the four structural detectors, scoring, ring building, the
/// ordered enrichment passes, community detection and fan-in promotion.
/// Later stages read and mutate what earlier stages produced, so the order
/// here is part of the output contract.
use crate::core::{AccountRecord, DetectionMode, FraudRing, RingPattern, Transaction};
use crate::graph::{AccountIndex, GraphBuilder};
use crate::modules::{
    CommunityDetector, CycleDetector, FanInDetector, FanInPromoter, FanOutDetector,
    MultiStageTagger, RelationshipIntel, RingBuilder, RingLeadership, Scorer, ShellChainDetector,
    ShellChainFindings, TemporalValidator,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_accounts_analyzed: usize,
    pub total_transactions: usize,
    pub suspicious_accounts_flagged: usize,
    pub fraud_rings_detected: usize,
    pub processing_time_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Sorted by suspicion score descending; ties keep first-observation order.
    pub accounts: Vec<AccountRecord>,
    /// Sorted by risk score descending; ties keep emission order.
    pub fraud_rings: Vec<FraudRing>,
    pub summary: AnalysisSummary,
}

#[derive(Debug, Default)]
pub struct AnalysisEngine;

impl AnalysisEngine {
    pub fn new() -> Self {
        AnalysisEngine
    }

    /// Run the full pipeline over one batch. Never fails on data:
    /// pathological inputs produce well-defined degenerate outputs.
    pub fn analyze(&self, transactions: Vec<Transaction>, mode: DetectionMode) -> AnalysisResult {
        let started = Instant::now();
        let total_transactions = transactions.len();
        tracing::info!(
            "Analyzing {} transactions (mode: {})",
            total_transactions,
            mode
        );

        // Stage 1: adjacency and account index
        let (graph, mut accounts) = GraphBuilder::build(transactions);

        // Stages 2-5: structural detectors, gated by mode
        let cycles = if mode.cycles_enabled() {
            CycleDetector::detect(&graph, &accounts)
        } else {
            Vec::new()
        };
        let fan_ins = if mode.fan_in_enabled() {
            FanInDetector::detect(&graph)
        } else {
            Vec::new()
        };
        let fan_outs = if mode.fan_out_enabled() {
            FanOutDetector::detect(&graph)
        } else {
            Vec::new()
        };
        let shells = if mode.shell_enabled() {
            ShellChainDetector::detect(&graph, &accounts)
        } else {
            ShellChainFindings::default()
        };
        tracing::info!(
            "Detectors: {} cycles, {} fan-in hubs, {} fan-out hubs, {} shell chains",
            cycles.len(),
            fan_ins.len(),
            fan_outs.len(),
            shells.chains.len()
        );

        // Stage 6: weighted scoring with false-positive dampening
        Scorer::score(&graph, &mut accounts, &cycles, &fan_ins, &fan_outs, &shells);

        // Stage 7: deterministic ring materialization
        let mut rings = RingBuilder::build(
            &graph, &mut accounts, &cycles, &fan_ins, &fan_outs, &shells,
        );
        debug_assert_consistent(&rings, &accounts);

        // Stage 8: ordered enrichment passes
        RelationshipIntel::adjust(&graph, &mut accounts);
        let removed = TemporalValidator::validate(&graph, &mut accounts, &mut rings);
        if removed > 0 {
            tracing::info!("Temporal validation removed {} cycle ring(s)", removed);
        }
        RingLeadership::assign(&graph, &mut accounts, &rings);
        MultiStageTagger::tag(&graph, &mut accounts, &rings);

        // Stage 9: community detection and two-phase fan-in promotion
        CommunityDetector::detect(&graph, &mut accounts, &mut rings);
        FanInPromoter::promote(&graph, &mut accounts, &rings, &fan_ins, &fan_outs, &shells);
        debug_assert_consistent(&rings, &accounts);

        let summary = AnalysisSummary {
            total_accounts_analyzed: accounts.len(),
            total_transactions,
            suspicious_accounts_flagged: accounts.values().filter(|a| a.is_suspicious).count(),
            fraud_rings_detected: rings.len(),
            processing_time_seconds: started.elapsed().as_secs_f64(),
        };
        tracing::info!(
            "Analysis complete: {}/{} accounts flagged, {} rings, {:.3}s",
            summary.suspicious_accounts_flagged,
            summary.total_accounts_analyzed,
            summary.fraud_rings_detected,
            summary.processing_time_seconds
        );

        let mut accounts: Vec<AccountRecord> = accounts.into_values().collect();
        accounts.sort_by(|a, b| b.suspicion_score.cmp(&a.suspicion_score));

        AnalysisResult {
            accounts,
            fraud_rings: rings,
            summary,
        }
    }
}

/// Stage-boundary consistency checks. Violations are programmer errors, not
/// data errors, and abort debug builds.
fn debug_assert_consistent(rings: &[FraudRing], accounts: &AccountIndex) {
    if cfg!(debug_assertions) {
        for ring in rings {
            debug_assert!(
                ring.members.iter().all(|m| accounts.contains_key(m)),
                "ring {} references an unknown account",
                ring.ring_id
            );
            debug_assert!(
                ring.pattern_type != RingPattern::Cycle || ring.members.len() >= 3,
                "cycle ring {} has fewer than 3 members",
                ring.ring_id
            );
            debug_assert_eq!(ring.member_count, ring.members.len());
        }
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

    fn cycle_txs() -> Vec<Transaction> {
        vec![
            tx("T1", "A", "B", 5000.0, "2024-01-01 10:00:00"),
            tx("T2", "B", "C", 4800.0, "2024-01-01 12:00:00"),
            tx("T3", "C", "A", 4600.0, "2024-01-01 14:00:00"),
        ]
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let result = AnalysisEngine::new().analyze(Vec::new(), DetectionMode::All);
        assert!(result.accounts.is_empty());
        assert!(result.fraud_rings.is_empty());
        assert_eq!(result.summary.total_transactions, 0);
        assert_eq!(result.summary.suspicious_accounts_flagged, 0);
    }

    #[test]
    fn test_cycle_pipeline_end_to_end() {
        let result = AnalysisEngine::new().analyze(cycle_txs(), DetectionMode::All);
        // The cycle ring plus the community that subsumes it on the members.
        assert_eq!(result.summary.fraud_rings_detected, 2);
        assert!(result
            .fraud_rings
            .iter()
            .any(|r| r.pattern_type == RingPattern::Cycle));
        assert!(result
            .fraud_rings
            .iter()
            .any(|r| r.pattern_type == RingPattern::Community));
        assert_eq!(result.summary.suspicious_accounts_flagged, 3);
        for account in &result.accounts {
            assert!(account.suspicion_score >= 40);
        }
    }

    #[test]
    fn test_mode_disables_detectors() {
        let result = AnalysisEngine::new().analyze(cycle_txs(), DetectionMode::FanIn);
        assert_eq!(result.summary.fraud_rings_detected, 0);
        assert_eq!(result.summary.suspicious_accounts_flagged, 0);
    }

    #[test]
    fn test_accounts_sorted_by_score() {
        let mut txs = cycle_txs();
        txs.push(tx("T4", "D", "A", 10.0, "2024-01-02 10:00:00"));
        let result = AnalysisEngine::new().analyze(txs, DetectionMode::All);
        for pair in result.accounts.windows(2) {
            assert!(pair[0].suspicion_score >= pair[1].suspicion_score);
        }
    }
}

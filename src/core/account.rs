/// Per-account analysis state
/// One mutable record per distinct account id, created on first observation
/// and mutated only by the pipeline stages in fixed order.
use serde::{Deserialize, Serialize};

pub const MAX_SUSPICION_SCORE: i64 = 100;

/// Per-pattern score contributions. The final suspicion score is always the
/// clamped sum of these plus the tracked adjustment delta.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternScores {
    pub fan_in: u32,
    pub fan_out: u32,
    pub cycle: u32,
    pub shell: u32,
    pub velocity: u32,
}

impl PatternScores {
    pub fn total(&self) -> i64 {
        (self.fan_in + self.fan_out + self.cycle + self.shell + self.velocity) as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RingRole {
    Orchestrator,
    Intermediary,
    Peripheral,
}

impl RingRole {
    /// Orchestrator outranks intermediary outranks peripheral when an account
    /// holds roles in several rings.
    pub fn rank(&self) -> u8 {
        match self {
            RingRole::Orchestrator => 2,
            RingRole::Intermediary => 1,
            RingRole::Peripheral => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LaunderingStage {
    MultiStage,
}

/// Two-phase fan-in promotion state. Annotative only; never feeds the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanInPromotion {
    #[default]
    None,
    AggregationCandidate,
    ConfirmedMoneyLaundering,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_id: String,
    pub total_transactions: usize,
    pub in_degree: usize,
    pub out_degree: usize,
    pub total_amount_sent: f64,
    pub total_amount_received: f64,
    pub pattern_scores: PatternScores,
    pub suspicion_score: u32,
    pub detected_patterns: Vec<String>,
    pub ring_ids: Vec<String>,
    pub triggered_algorithms: Vec<String>,
    pub explanation: String,
    pub is_suspicious: bool,
    pub centrality_score: f64,
    pub ring_role: Option<RingRole>,
    pub laundering_stage: Option<LaunderingStage>,
    pub flow_pattern: Option<String>,
    pub fan_in_promotion: FanInPromotion,
    /// Accumulated bounded deltas from dampening and enrichment. Internal
    /// bookkeeping so the score stays a clamped sum at every point.
    #[serde(skip)]
    pub score_adjustment: i64,
}

impl AccountRecord {
    pub fn new(account_id: &str) -> Self {
        AccountRecord {
            account_id: account_id.to_string(),
            total_transactions: 0,
            in_degree: 0,
            out_degree: 0,
            total_amount_sent: 0.0,
            total_amount_received: 0.0,
            pattern_scores: PatternScores::default(),
            suspicion_score: 0,
            detected_patterns: Vec::new(),
            ring_ids: Vec::new(),
            triggered_algorithms: Vec::new(),
            explanation: String::new(),
            is_suspicious: false,
            centrality_score: 0.0,
            ring_role: None,
            laundering_stage: None,
            flow_pattern: None,
            fan_in_promotion: FanInPromotion::default(),
            score_adjustment: 0,
        }
    }

    /// Re-derive the suspicion score from the pattern sum and the tracked
    /// adjustment, clamped to 0..=100, and refresh the suspicious flag.
    pub fn recompute_score(&mut self) {
        let raw = self.pattern_scores.total() + self.score_adjustment;
        self.suspicion_score = raw.clamp(0, MAX_SUSPICION_SCORE) as u32;
        self.is_suspicious = self.suspicion_score > 0;
    }

    /// Apply a bounded additive delta (negative for exoneration signals).
    pub fn apply_adjustment(&mut self, delta: i64) {
        self.score_adjustment += delta;
        self.recompute_score();
    }

    /// Ordered-unique insert of a pattern tag.
    pub fn add_pattern(&mut self, tag: &str) {
        if !self.detected_patterns.iter().any(|p| p == tag) {
            self.detected_patterns.push(tag.to_string());
        }
    }

    pub fn remove_pattern(&mut self, tag: &str) {
        self.detected_patterns.retain(|p| p != tag);
    }

    /// Ordered-unique insert of a human-readable algorithm label.
    pub fn add_algorithm(&mut self, label: &str) {
        if !self.triggered_algorithms.iter().any(|a| a == label) {
            self.triggered_algorithms.push(label.to_string());
        }
    }

    /// Ordered-unique insert of a ring id.
    pub fn add_ring(&mut self, ring_id: &str) {
        if !self.ring_ids.iter().any(|r| r == ring_id) {
            self.ring_ids.push(ring_id.to_string());
        }
    }

    pub fn remove_ring(&mut self, ring_id: &str) {
        self.ring_ids.retain(|r| r != ring_id);
    }

    /// Append one sentence to the period-joined explanation log.
    pub fn explain(&mut self, sentence: &str) {
        if !self.explanation.is_empty() {
            self.explanation.push(' ');
        }
        self.explanation.push_str(sentence);
        self.explanation.push('.');
    }

    /// Keep the strongest role observed across rings.
    pub fn upgrade_role(&mut self, role: RingRole) {
        match self.ring_role {
            Some(current) if current.rank() >= role.rank() => {}
            _ => self.ring_role = Some(role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_clamped_sum() {
        let mut acct = AccountRecord::new("A");
        acct.pattern_scores.cycle = 40;
        acct.pattern_scores.shell = 35;
        acct.pattern_scores.fan_in = 30;
        acct.recompute_score();
        assert_eq!(acct.suspicion_score, 100);
        assert!(acct.is_suspicious);

        acct.apply_adjustment(-30);
        assert_eq!(acct.suspicion_score, 75);
    }

    #[test]
    fn test_adjustment_floors_at_zero() {
        let mut acct = AccountRecord::new("A");
        acct.pattern_scores.velocity = 15;
        acct.apply_adjustment(-30);
        assert_eq!(acct.suspicion_score, 0);
        assert!(!acct.is_suspicious);
    }

    #[test]
    fn test_ordered_unique_lists() {
        let mut acct = AccountRecord::new("A");
        acct.add_pattern("cycle");
        acct.add_pattern("fan_in");
        acct.add_pattern("cycle");
        assert_eq!(acct.detected_patterns, vec!["cycle", "fan_in"]);

        acct.add_ring("RING_001");
        acct.add_ring("RING_001");
        acct.add_ring("RING_002");
        acct.remove_ring("RING_001");
        assert_eq!(acct.ring_ids, vec!["RING_002"]);
    }

    #[test]
    fn test_explanation_is_period_joined() {
        let mut acct = AccountRecord::new("A");
        acct.explain("Participates in a 3-member cycle");
        acct.explain("High transaction velocity");
        assert_eq!(
            acct.explanation,
            "Participates in a 3-member cycle. High transaction velocity."
        );
    }

    #[test]
    fn test_role_upgrade_keeps_strongest() {
        let mut acct = AccountRecord::new("A");
        acct.upgrade_role(RingRole::Peripheral);
        acct.upgrade_role(RingRole::Orchestrator);
        acct.upgrade_role(RingRole::Intermediary);
        assert_eq!(acct.ring_role, Some(RingRole::Orchestrator));
    }
}

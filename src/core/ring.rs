/// Fraud ring output type
/// Rings are produced by the ring builder and the community detector; member
/// ids are held by value so ring removal needs no pointer bookkeeping.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingPattern {
    Cycle,
    FanIn,
    FanOut,
    ShellChain,
    Community,
}

impl RingPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            RingPattern::Cycle => "cycle",
            RingPattern::FanIn => "fan_in",
            RingPattern::FanOut => "fan_out",
            RingPattern::ShellChain => "shell_chain",
            RingPattern::Community => "community",
        }
    }
}

impl fmt::Display for RingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudRing {
    pub ring_id: String,
    pub pattern_type: RingPattern,
    /// For cycles this is the traversal order; for fan-in/fan-out the hub
    /// comes first; for shell chains the path order.
    pub members: Vec<String>,
    pub member_count: usize,
    pub risk_score: u32,
    pub total_value: f64,
    pub explanation: String,
}

impl FraudRing {
    pub fn contains(&self, account_id: &str) -> bool {
        self.members.iter().any(|m| m == account_id)
    }
}

/// Pattern ring id from the shared monotonic counter.
pub fn pattern_ring_id(seq: usize) -> String {
    format!("RING_{:03}", seq)
}

/// Community ring id from its own counter.
pub fn community_ring_id(seq: usize) -> String {
    format!("RING_COMM_{:03}", seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_id_formats() {
        assert_eq!(pattern_ring_id(1), "RING_001");
        assert_eq!(pattern_ring_id(42), "RING_042");
        assert_eq!(pattern_ring_id(1000), "RING_1000");
        assert_eq!(community_ring_id(3), "RING_COMM_003");
    }

    #[test]
    fn test_pattern_tags() {
        assert_eq!(RingPattern::ShellChain.as_str(), "shell_chain");
        assert_eq!(RingPattern::FanIn.to_string(), "fan_in");
    }
}

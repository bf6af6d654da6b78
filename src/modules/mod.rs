pub mod community_detector;
pub mod cycle_detector;
pub mod fan_in_detector;
pub mod fan_in_promoter;
pub mod fan_out_detector;
pub mod multi_stage;
pub mod relationship_intel;
pub mod ring_builder;
pub mod ring_leadership;
pub mod scorer;
pub mod shell_chain_detector;
pub mod temporal_validator;

pub use community_detector::CommunityDetector;
pub use cycle_detector::CycleDetector;
pub use fan_in_detector::{FanInDetector, FanInHit};
pub use fan_in_promoter::FanInPromoter;
pub use fan_out_detector::{FanOutDetector, FanOutHit};
pub use multi_stage::MultiStageTagger;
pub use relationship_intel::RelationshipIntel;
pub use ring_builder::RingBuilder;
pub use ring_leadership::RingLeadership;
pub use scorer::Scorer;
pub use shell_chain_detector::{ShellChainDetector, ShellChainFindings};
pub use temporal_validator::TemporalValidator;

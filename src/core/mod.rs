pub mod account;
pub mod config;
pub mod errors;
pub mod ring;
pub mod transaction;

pub use account::{
    AccountRecord, FanInPromotion, LaunderingStage, PatternScores, RingRole, MAX_SUSPICION_SCORE,
};
pub use config::Config;
pub use errors::{EngineError, Result};
pub use ring::{community_ring_id, pattern_ring_id, FraudRing, RingPattern};
pub use transaction::{
    format_timestamp, parse_timestamp, DetectionMode, Transaction, TIMESTAMP_FORMAT,
};

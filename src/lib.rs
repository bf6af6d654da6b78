pub mod analysis;
pub mod api;
pub mod core;
pub mod graph;
pub mod ingest;
pub mod metrics;
pub mod modules;

pub use analysis::{AnalysisEngine, AnalysisResult, AnalysisSummary};
pub use core::{
    AccountRecord, Config, DetectionMode, EngineError, FanInPromotion, FraudRing, RingPattern,
    RingRole, Transaction,
};

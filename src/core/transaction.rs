/// Transaction input types
/// The validated record stream the detection pipeline consumes, plus the
/// detection mode switch selecting which detectors run.
use crate::core::errors::EngineError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single bank transaction. Immutable once ingested; input order is
/// preserved by every pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: f64,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
}

impl Transaction {
    /// Seconds since the epoch, used for window arithmetic.
    pub fn epoch_seconds(&self) -> i64 {
        self.timestamp.and_utc().timestamp()
    }

    pub fn is_self_transfer(&self) -> bool {
        self.sender_id == self.receiver_id
    }
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, EngineError> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| EngineError::InvalidTimestamp(format!("{}: {}", raw, e)))
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Serde adapter for the `YYYY-MM-DD HH:MM:SS` wire format.
mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Selects which detectors run. Detectors outside the selected mode produce
/// empty results; scoring, enrichment and community detection always run on
/// whatever was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMode {
    All,
    Cycles,
    FanIn,
    FanOut,
    Shell,
}

impl DetectionMode {
    pub fn cycles_enabled(&self) -> bool {
        matches!(self, DetectionMode::All | DetectionMode::Cycles)
    }

    pub fn fan_in_enabled(&self) -> bool {
        matches!(self, DetectionMode::All | DetectionMode::FanIn)
    }

    pub fn fan_out_enabled(&self) -> bool {
        matches!(self, DetectionMode::All | DetectionMode::FanOut)
    }

    pub fn shell_enabled(&self) -> bool {
        matches!(self, DetectionMode::All | DetectionMode::Shell)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMode::All => "all",
            DetectionMode::Cycles => "cycles",
            DetectionMode::FanIn => "fan-in",
            DetectionMode::FanOut => "fan-out",
            DetectionMode::Shell => "shell",
        }
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectionMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(DetectionMode::All),
            "cycles" => Ok(DetectionMode::Cycles),
            "fan-in" => Ok(DetectionMode::FanIn),
            "fan-out" => Ok(DetectionMode::FanOut),
            "shell" => Ok(DetectionMode::Shell),
            other => Err(EngineError::InvalidMode(other.to_string())),
        }
    }
}

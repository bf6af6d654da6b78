use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown detection mode: {0}")]
    InvalidMode(String),

    #[error("Ingest error: {0}")]
    IngestError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal state error: {0}")]
    InternalState(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

use crate::core::transaction::DetectionMode;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub default_mode: DetectionMode,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            host: env::var("RINGTRACE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("RINGTRACE_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            default_mode: env::var("RINGTRACE_DEFAULT_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DetectionMode::All),
        }
    }
}

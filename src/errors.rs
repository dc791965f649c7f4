//! Error types for flowpulse

use thiserror::Error;

/// Main error type for flowpulse
#[derive(Error, Debug)]
pub enum FlowpulseError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed or empty diagram text
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),

    /// Missing client credentials or a rejected token request
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Timeout after {0:.1} seconds")]
    Timeout(f64),

    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Engine-level fault not attributable to a single step
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

impl FlowpulseError {
    /// Map a transport error, keeping timeouts distinct from other failures
    pub fn from_transport(err: reqwest::Error, timeout: std::time::Duration) -> Self {
        if err.is_timeout() {
            FlowpulseError::Timeout(timeout.as_secs_f64())
        } else {
            FlowpulseError::Request(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowpulseError>;

//! Error types for the machine core
//!
//! Runtime operations (bet, lever, stop, tick) never fail; rejected input is
//! ignored. Errors only surface while building or loading a configuration.

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum MachineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MachineError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_yml::Error> for MachineError {
    fn from(e: serde_yml::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type alias
pub type MachineResult<T> = Result<T, MachineError>;

//! Error types shared across the crate.
//!
//! Decision operations (selection, admission, cooldowns) never fail; they
//! return values. Only configuration loading and probing produce errors.

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Outcome of a failed reachability probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// No address is known for this backend id.
    #[error("unknown backend `{0}`")]
    UnknownBackend(String),

    #[error("probe timed out")]
    Timeout,

    #[error("connect failed: {0}")]
    Connect(#[from] std::io::Error),
}

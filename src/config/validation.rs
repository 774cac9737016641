//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and cross references.
//! Every problem is reported, not just the first one.

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::GuardConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.health_check.interval_ms == 0 {
        errors.push(ValidationError::new("health_check.interval_ms", "must be greater than 0"));
    }
    if config.health_check.timeout_ms == 0 {
        errors.push(ValidationError::new("health_check.timeout_ms", "must be greater than 0"));
    }
    if config.anti_flood.command_limit == 0 {
        errors.push(ValidationError::new("anti_flood.command_limit", "must be at least 1"));
    }
    if config.anti_flood.clear_time_ms == 0 {
        errors.push(ValidationError::new("anti_flood.clear_time_ms", "must be greater than 0"));
    }

    let mut lobbies = HashSet::new();
    for name in &config.lobby_servers {
        if !lobbies.insert(name.as_str()) {
            errors.push(ValidationError::new(
                "lobby_servers",
                format!("duplicate lobby server `{}`", name),
            ));
        }
    }

    let mut names = HashSet::new();
    for backend in &config.backends {
        if !names.insert(backend.name.as_str()) {
            errors.push(ValidationError::new(
                "backends",
                format!("duplicate backend name `{}`", backend.name),
            ));
        }
        if backend.address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                format!("backends.{}.address", backend.name),
                format!("invalid socket address `{}`", backend.address),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

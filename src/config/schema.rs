//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the guard.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the lobby guard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Backend ids that make up the lobby pool.
    pub lobby_servers: Vec<String>,

    /// Backend address book used by the TCP probe.
    pub backends: Vec<BackendConfig>,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Command flood protection.
    pub anti_flood: AntiFloodConfig,

    /// Player report cooldown.
    pub report: FeatureConfig,

    /// Help request cooldown.
    pub helpop: FeatureConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            lobby_servers: vec!["lobby".to_string(), "lobby2".to_string()],
            backends: Vec::new(),
            health_check: HealthCheckConfig::default(),
            anti_flood: AntiFloodConfig::default(),
            report: FeatureConfig::with_cooldown(3),
            helpop: FeatureConfig::with_cooldown(30),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl GuardConfig {
    /// Return true if `id` is one of the configured lobby servers.
    pub fn is_lobby_server(&self, id: &str) -> bool {
        self.lobby_servers.iter().any(|name| name == id)
    }
}

/// Backend server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Unique backend identifier.
    pub name: String,

    /// Backend address (e.g., "127.0.0.1:25566").
    pub address: String,
}

/// Health check configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable active health checks.
    pub enabled: bool,

    /// Probe interval in milliseconds.
    pub interval_ms: u64,

    /// Probe timeout in milliseconds.
    pub timeout_ms: u64,
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 500,
            timeout_ms: 1000,
        }
    }
}

/// Command flood protection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AntiFloodConfig {
    /// Enable the flood limiter.
    pub enabled: bool,

    /// Commands allowed per window; the next one disconnects the player.
    pub command_limit: u32,

    /// Window length in milliseconds.
    pub clear_time_ms: u64,

    /// Disconnect reason shown to the player.
    pub message: String,
}

impl AntiFloodConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.clear_time_ms)
    }
}

impl Default for AntiFloodConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command_limit: 10,
            clear_time_ms: 1000,
            message: "You are sending too many commands!".to_string(),
        }
    }
}

/// Per-feature toggle and cooldown.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Enable the feature.
    pub enabled: bool,

    /// Cooldown between uses per player, in seconds. Zero disables the cooldown.
    pub cooldown_secs: u64,
}

impl FeatureConfig {
    pub fn with_cooldown(cooldown_secs: u64) -> Self {
        Self {
            enabled: true,
            cooldown_secs,
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self::with_cooldown(0)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

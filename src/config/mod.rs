//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GuardConfig (validated, immutable)
//!     → held in an ArcSwap by LobbyGuard
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → LobbyGuard::apply_config swaps the Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::AntiFloodConfig;
pub use schema::BackendConfig;
pub use schema::FeatureConfig;
pub use schema::GuardConfig;
pub use schema::HealthCheckConfig;
pub use schema::ObservabilityConfig;

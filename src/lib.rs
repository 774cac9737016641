//! Lobby selection and flood protection for a multi-backend game proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!   backend registered / removed             command / event handlers
//!   ─────────────────────────────┐           ───────────┬────────────────
//!                                ▼                      │
//!                    ┌──────────────────────┐           │ select_best
//!                    │  candidate registry  │◀──────────┤ is_candidate
//!                    └──────────┬───────────┘           │
//!             probe / reconcile │                       │ admission_check
//!                    ┌──────────┴───────────┐           ├──────────────▶ flood limiter
//!                    │    health monitor    │           │
//!                    │  (recurring timer)   │           │ cooldown_try_acquire
//!                    └──────────────────────┘           └──────────────▶ cooldown caches
//! ```
//!
//! [`LobbyGuard`] owns all of it and is the only type handlers need.

pub mod config;
pub mod error;
pub mod guard;
pub mod health;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod security;

pub use config::GuardConfig;
pub use guard::{Feature, LobbyGuard, LobbyRoute, PlayerId};
pub use lifecycle::Shutdown;
pub use load_balancer::candidate::CandidateServer;
pub use security::cooldown::Cooldown;
pub use security::rate_limit::Admission;

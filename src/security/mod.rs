//! Abuse protection subsystem.
//!
//! # Data Flow
//! ```text
//! Player runs a command:
//!     → rate_limit.rs (count against the flood window; terminate past the cap)
//!
//! Player uses a spam-prone feature (report, helpop):
//!     → cooldown.rs (that feature's cache; deny with remaining wait)
//! ```
//!
//! # Design Decisions
//! - State is keyed by player identity, one map entry per identity
//! - Check and update for one identity happen under that entry's lock
//! - Denials are values, never errors
//! - Entries die by time, never by business logic

pub mod cooldown;
pub mod rate_limit;

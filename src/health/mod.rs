//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Recurring timer (active.rs):
//!     → reconcile tracked lobby servers into the registry
//!     → probe.rs: one probe future per candidate, each spawned on its own
//!     → on completion: state.rs records the outcome on the candidate
//! ```
//!
//! # Design Decisions
//! - The timer never awaits a probe; results arrive out of band
//! - A failed, timed-out or panicking probe marks the candidate unhealthy
//!   until a later probe succeeds; nothing is retried out of band
//! - Results are ordered by completion, so a slow old probe cannot
//!   overwrite a newer one
//! - Health state is per candidate; there is no ordering across candidates

pub mod active;
pub mod probe;
pub mod state;

//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (LobbyGuard::start):
//!     Config → registry reconcile → health monitor timer → cooldown sweeper
//!
//! Scheduling (scheduler.rs):
//!     run_every → recurring ticks (health probes, cache sweeps)
//!     run_after → one-shot timers (flood window expiry)
//!
//! Shutdown (shutdown.rs):
//!     Signal received (signals.rs) → broadcast → every scheduled task exits
//! ```
//!
//! # Design Decisions
//! - All background work lives on the tokio runtime; no dedicated threads
//! - One broadcast signal reaches every timer, including fire-and-forget ones
//! - Recurring timers are also cancelled directly so nothing outlives its owner

pub mod scheduler;
pub mod shutdown;
pub mod signals;

pub use scheduler::{Scheduler, TaskHandle};
pub use shutdown::Shutdown;

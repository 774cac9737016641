//! Lobby load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Backend lifecycle notification
//!     → registry.rs (register / unregister candidate)
//!
//! "Send me to a lobby"
//!     → selector.rs (snapshot the registry)
//!     → least_players.rs (healthy only, fewest players, first wins ties)
//!     → CandidateServer or None
//! ```
//!
//! # Design Decisions
//! - Candidates are keyed by backend id, never by object identity
//! - Player counts are read from the directory at selection time, never cached
//! - Selection is a pure in-memory operation; no I/O
//! - Unhealthy candidates stay registered but are excluded from selection

pub mod candidate;
pub mod directory;
pub mod least_players;
pub mod registry;
pub mod selector;

use crate::load_balancer::candidate::CandidateServer;

/// Read access to the proxy's backends.
pub trait BackendDirectory: Send + Sync {
    /// Whether the proxy currently has a backend with this id.
    fn is_known(&self, id: &str) -> bool;

    /// Players currently connected to the backend.
    fn connected_count(&self, id: &str) -> usize;
}

/// A selection strategy over a candidate snapshot.
pub trait LoadBalancer: Send + Sync {
    fn select(
        &self,
        candidates: &[CandidateServer],
        directory: &dyn BackendDirectory,
    ) -> Option<CandidateServer>;
}

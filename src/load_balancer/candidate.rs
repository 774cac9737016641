//! Lobby candidate abstraction.
//!
//! # Responsibilities
//! - Represent a single backend eligible to receive routed players
//! - Own the candidate's health record (written only by the health monitor)
//! - Hand out point-in-time copies for selection

use std::sync::Mutex;

use tokio::time::Instant;

use crate::health::state::{HealthRecord, ProbeUpdate};

/// A registered candidate. Owned by the registry, shared with in-flight probes.
#[derive(Debug)]
pub struct Candidate {
    id: String,
    health: Mutex<HealthRecord>,
}

impl Candidate {
    /// Create a candidate that is healthy until its first probe.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            health: Mutex::new(HealthRecord::unprobed()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current health record.
    pub fn health(&self) -> HealthRecord {
        *self.health.lock().expect("candidate health mutex poisoned")
    }

    pub fn is_healthy(&self) -> bool {
        self.health().healthy
    }

    /// Record a completed probe.
    pub(crate) fn record_probe(&self, healthy: bool, completed_at: Instant) -> ProbeUpdate {
        self.health
            .lock()
            .expect("candidate health mutex poisoned")
            .apply(healthy, completed_at)
    }

    /// Point-in-time copy of this candidate.
    pub fn snapshot(&self) -> CandidateServer {
        let health = self.health();
        CandidateServer {
            id: self.id.clone(),
            healthy: health.healthy,
            last_probe_at: health.last_probe_at,
        }
    }
}

/// Detached copy of a candidate, safe to hold across registry mutations.
///
/// The live player count is deliberately absent; it is read from the
/// [`BackendDirectory`](crate::load_balancer::BackendDirectory) at selection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateServer {
    pub id: String,
    pub healthy: bool,
    pub last_probe_at: Option<Instant>,
}

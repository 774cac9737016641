//! Candidate registry.
//!
//! # Responsibilities
//! - Hold the lobby candidates keyed by backend id, in registration order
//! - Absorb duplicate and out-of-order lifecycle notifications as no-ops
//! - Provide point-in-time snapshots for selection and probing

use std::sync::{Arc, RwLock};

use crate::load_balancer::candidate::{Candidate, CandidateServer};
use crate::observability::metrics;

/// Concurrent set of lobby candidates.
///
/// Lobby pools are small, so a vector behind a lock keeps registration order
/// and gives true point-in-time copies without per-shard iteration.
#[derive(Debug, Default)]
pub struct CandidateRegistry {
    candidates: RwLock<Vec<Arc<Candidate>>>,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a candidate. Returns false if `id` was already present.
    pub fn register(&self, id: &str) -> bool {
        let mut candidates = self.candidates.write().expect("candidate registry lock poisoned");
        if candidates.iter().any(|c| c.id() == id) {
            return false;
        }
        candidates.push(Arc::new(Candidate::new(id)));
        metrics::record_candidate_count(candidates.len());
        true
    }

    /// Remove a candidate. Returns false if `id` was not present.
    pub fn unregister(&self, id: &str) -> bool {
        let mut candidates = self.candidates.write().expect("candidate registry lock poisoned");
        let before = candidates.len();
        candidates.retain(|c| c.id() != id);
        let removed = candidates.len() != before;
        if removed {
            metrics::record_candidate_count(candidates.len());
        }
        removed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.candidates
            .read()
            .expect("candidate registry lock poisoned")
            .iter()
            .any(|c| c.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Candidate>> {
        self.candidates
            .read()
            .expect("candidate registry lock poisoned")
            .iter()
            .find(|c| c.id() == id)
            .cloned()
    }

    /// Shared handles to every candidate, in registration order (for probing).
    pub fn entries(&self) -> Vec<Arc<Candidate>> {
        self.candidates.read().expect("candidate registry lock poisoned").clone()
    }

    /// Detached copies of every candidate, in registration order (for selection).
    pub fn snapshot(&self) -> Vec<CandidateServer> {
        self.candidates
            .read()
            .expect("candidate registry lock poisoned")
            .iter()
            .map(|c| c.snapshot())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.candidates.read().expect("candidate registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

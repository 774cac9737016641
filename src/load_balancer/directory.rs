//! In-memory backend directory.

use dashmap::DashMap;

use crate::config::BackendConfig;
use crate::load_balancer::BackendDirectory;

/// A directory backed by a concurrent map of backend id -> connected players.
///
/// Used by the host binary (which has no player connections of its own) and
/// by tests that need to steer player counts.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    players: DashMap<String, usize>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every configured backend is known, with no players.
    pub fn from_backends(backends: &[BackendConfig]) -> Self {
        let directory = Self::new();
        for backend in backends {
            directory.add(&backend.name);
        }
        directory
    }

    /// Make a backend known, keeping its count if it already was.
    pub fn add(&self, id: &str) {
        self.players.entry(id.to_string()).or_insert(0);
    }

    pub fn remove(&self, id: &str) {
        self.players.remove(id);
    }

    /// Set the connected player count, making the backend known.
    pub fn set_connected(&self, id: &str, count: usize) {
        self.players.insert(id.to_string(), count);
    }
}

impl BackendDirectory for StaticDirectory {
    fn is_known(&self, id: &str) -> bool {
        self.players.contains_key(id)
    }

    fn connected_count(&self, id: &str) -> usize {
        self.players.get(id).map(|count| *count).unwrap_or(0)
    }
}

//! Lobby selection over the candidate registry.

use std::sync::Arc;

use crate::load_balancer::{
    candidate::CandidateServer, registry::CandidateRegistry, BackendDirectory, LoadBalancer,
};

/// Answers "where should this player go" from the registry's current snapshot.
pub struct LobbySelector {
    registry: Arc<CandidateRegistry>,
    directory: Arc<dyn BackendDirectory>,
    strategy: Box<dyn LoadBalancer>,
}

impl LobbySelector {
    pub fn new(
        registry: Arc<CandidateRegistry>,
        directory: Arc<dyn BackendDirectory>,
        strategy: Box<dyn LoadBalancer>,
    ) -> Self {
        Self {
            registry,
            directory,
            strategy,
        }
    }

    /// Pick the best routing target. `None` means no destination is available.
    pub fn select_best(&self) -> Option<CandidateServer> {
        let candidates = self.registry.snapshot();
        let selected = self.strategy.select(&candidates, self.directory.as_ref());
        if selected.is_none() {
            tracing::debug!(candidate_count = candidates.len(), "No healthy lobby candidate");
        }
        selected
    }

    /// Whether `id` is part of the lobby pool, healthy or not.
    pub fn is_candidate(&self, id: &str) -> bool {
        self.registry.contains(id)
    }
}

//! Least players load balancing strategy.

use crate::load_balancer::{candidate::CandidateServer, BackendDirectory, LoadBalancer};

/// Least players selector.
/// Selects the healthy candidate with the fewest connected players.
#[derive(Debug, Default)]
pub struct LeastPlayers;

impl LeastPlayers {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for LeastPlayers {
    fn select(
        &self,
        candidates: &[CandidateServer],
        directory: &dyn BackendDirectory,
    ) -> Option<CandidateServer> {
        // In case of tie, the first one is selected (stability)
        candidates
            .iter()
            .filter(|c| c.healthy)
            .min_by_key(|c| directory.connected_count(&c.id))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::directory::StaticDirectory;

    fn candidate(id: &str, healthy: bool) -> CandidateServer {
        CandidateServer {
            id: id.to_string(),
            healthy,
            last_probe_at: None,
        }
    }

    #[test]
    fn test_least_players() {
        let lb = LeastPlayers::new();
        let directory = StaticDirectory::new();
        directory.set_connected("a", 2);
        directory.set_connected("b", 5);
        directory.set_connected("c", 0);

        let candidates = vec![candidate("a", true), candidate("b", true), candidate("c", false)];
        assert_eq!(lb.select(&candidates, &directory).unwrap().id, "a");

        directory.set_connected("a", 7);
        assert_eq!(lb.select(&candidates, &directory).unwrap().id, "b");
    }

    #[test]
    fn test_tie_goes_to_first() {
        let lb = LeastPlayers::new();
        let directory = StaticDirectory::new();
        directory.set_connected("a", 3);
        directory.set_connected("b", 3);

        let candidates = vec![candidate("b", true), candidate("a", true)];
        assert_eq!(lb.select(&candidates, &directory).unwrap().id, "b");
    }

    #[test]
    fn test_no_healthy_candidate() {
        let lb = LeastPlayers::new();
        let directory = StaticDirectory::new();

        assert!(lb.select(&[], &directory).is_none());
        assert!(lb.select(&[candidate("a", false)], &directory).is_none());
    }
}

//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every lobby candidate
//! - Record each probe's outcome when it completes, off the timer task
//! - Register tracked lobby servers that the proxy knows about but the
//!   registry does not hold yet

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::time::{self, Instant};

use crate::config::GuardConfig;
use crate::error::ProbeError;
use crate::health::probe::Probe;
use crate::health::state::ProbeUpdate;
use crate::lifecycle::{Scheduler, TaskHandle};
use crate::load_balancer::candidate::Candidate;
use crate::load_balancer::registry::CandidateRegistry;
use crate::load_balancer::BackendDirectory;
use crate::observability::metrics;

pub struct HealthMonitor {
    registry: Arc<CandidateRegistry>,
    directory: Arc<dyn BackendDirectory>,
    probe: Arc<dyn Probe>,
    config: Arc<ArcSwap<GuardConfig>>,
}

impl HealthMonitor {
    pub fn new(
        registry: Arc<CandidateRegistry>,
        directory: Arc<dyn BackendDirectory>,
        probe: Arc<dyn Probe>,
        config: Arc<ArcSwap<GuardConfig>>,
    ) -> Self {
        Self {
            registry,
            directory,
            probe,
            config,
        }
    }

    /// Start ticking at the configured interval. The first tick runs immediately.
    pub fn spawn(self, scheduler: &Scheduler) -> TaskHandle {
        let interval = self.config.load().health_check.interval();

        tracing::info!(
            interval_ms = interval.as_millis() as u64,
            "Health monitor starting"
        );

        scheduler.run_every(interval, move || self.tick())
    }

    /// One round: reconcile, then dispatch a probe per candidate.
    ///
    /// Never waits on a probe. Must be called from inside a tokio runtime.
    pub fn tick(&self) {
        self.reconcile();

        let config = self.config.load();
        if !config.health_check.enabled {
            return;
        }

        let timeout = config.health_check.timeout();
        for candidate in self.registry.entries() {
            self.dispatch(candidate, timeout);
        }
    }

    /// Register every tracked lobby server the proxy currently knows and
    /// drop candidates that are no longer tracked. Returns how many were added.
    ///
    /// Pruning runs against a fresh config load, so a candidate re-added by a
    /// round that raced a config swap is removed on the following round.
    pub fn reconcile(&self) -> usize {
        let config = self.config.load();
        let mut added = 0;

        for id in &config.lobby_servers {
            if self.directory.is_known(id) && self.registry.register(id) {
                tracing::info!(candidate = %id, "Tracked lobby server registered as candidate");
                added += 1;
            }
        }

        let config = self.config.load();
        for candidate in self.registry.entries() {
            if !config.is_lobby_server(candidate.id()) && self.registry.unregister(candidate.id()) {
                tracing::info!(candidate = %candidate.id(), "Untracked candidate unregistered");
            }
        }
        added
    }

    fn dispatch(&self, candidate: Arc<Candidate>, timeout: Duration) {
        let probe = self.probe.clone();
        let future = match panic::catch_unwind(AssertUnwindSafe(|| probe.probe(candidate.id()))) {
            Ok(future) => future,
            Err(_) => {
                tracing::warn!(candidate = %candidate.id(), "Probe panicked before dispatch");
                record_outcome(&candidate, false, Instant::now());
                return;
            }
        };

        tokio::spawn(async move {
            // The probe runs in its own task so a panic inside it is contained.
            let mut probe_task = tokio::spawn(future);

            let result = match time::timeout(timeout, &mut probe_task).await {
                Ok(Ok(result)) => result,
                Ok(Err(join_error)) => {
                    tracing::warn!(
                        candidate = %candidate.id(),
                        error = %join_error,
                        "Probe task failed"
                    );
                    record_outcome(&candidate, false, Instant::now());
                    return;
                }
                Err(_) => {
                    probe_task.abort();
                    Err(ProbeError::Timeout)
                }
            };

            let completed_at = Instant::now();
            if let Err(e) = &result {
                tracing::debug!(candidate = %candidate.id(), error = %e, "Probe failed");
            }
            record_outcome(&candidate, result.is_ok(), completed_at);
        });
    }
}

fn record_outcome(candidate: &Candidate, healthy: bool, completed_at: Instant) {
    match candidate.record_probe(healthy, completed_at) {
        ProbeUpdate::Transitioned if healthy => {
            tracing::info!(candidate = %candidate.id(), "Lobby candidate is reachable again");
        }
        ProbeUpdate::Transitioned => {
            tracing::info!(candidate = %candidate.id(), "Lobby candidate became unreachable");
        }
        ProbeUpdate::Stale => {
            tracing::debug!(candidate = %candidate.id(), "Dropped out-of-order probe result");
        }
        ProbeUpdate::Unchanged => {}
    }

    metrics::record_candidate_health(candidate.id(), candidate.is_healthy());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::probe::ProbeFuture;
    use crate::health::state::HealthRecord;
    use crate::lifecycle::Shutdown;
    use crate::load_balancer::directory::StaticDirectory;
    use dashmap::DashMap;
    use futures_util::future::{self, FutureExt};

    #[derive(Default)]
    struct ScriptedProbe {
        up: DashMap<String, bool>,
    }

    impl Probe for ScriptedProbe {
        fn probe(&self, id: &str) -> ProbeFuture {
            let up = self.up.get(id).map(|u| *u).unwrap_or(false);
            let id = id.to_string();
            async move {
                if up {
                    Ok(())
                } else {
                    Err(ProbeError::UnknownBackend(id))
                }
            }
            .boxed()
        }
    }

    struct PanickingProbe;

    impl Probe for PanickingProbe {
        fn probe(&self, id: &str) -> ProbeFuture {
            if id == "sync" {
                panic!("probe construction failed");
            }
            let id = id.to_string();
            async move {
                if id == "async" {
                    panic!("probe future failed");
                }
                Ok(())
            }
            .boxed()
        }
    }

    struct HangingProbe;

    impl Probe for HangingProbe {
        fn probe(&self, _id: &str) -> ProbeFuture {
            future::pending().boxed()
        }
    }

    fn config_with(lobbies: &[&str], timeout_ms: u64) -> Arc<ArcSwap<GuardConfig>> {
        let mut config = GuardConfig::default();
        config.lobby_servers = lobbies.iter().map(|s| s.to_string()).collect();
        config.health_check.interval_ms = 20;
        config.health_check.timeout_ms = timeout_ms;
        Arc::new(ArcSwap::from_pointee(config))
    }

    fn monitor(
        lobbies: &[&str],
        probe: Arc<dyn Probe>,
    ) -> (Arc<CandidateRegistry>, Arc<StaticDirectory>, HealthMonitor) {
        let registry = Arc::new(CandidateRegistry::new());
        let directory = Arc::new(StaticDirectory::new());
        for id in lobbies {
            directory.add(id);
        }
        let monitor = HealthMonitor::new(
            registry.clone(),
            directory.clone(),
            probe,
            config_with(lobbies, 200),
        );
        (registry, directory, monitor)
    }

    async fn wait_for_probe(registry: &CandidateRegistry, id: &str) -> HealthRecord {
        for _ in 0..100 {
            if let Some(candidate) = registry.get(id) {
                let record = candidate.health();
                if record.last_probe_at.is_some() {
                    return record;
                }
            }
            time::sleep(Duration::from_millis(5)).await;
        }
        panic!("candidate {id} was never probed");
    }

    #[tokio::test]
    async fn test_tick_records_probe_outcomes() {
        let probe = Arc::new(ScriptedProbe::default());
        probe.up.insert("a".into(), true);
        probe.up.insert("b".into(), false);
        let (registry, _, monitor) = monitor(&["a", "b"], probe.clone());

        monitor.tick();

        assert!(wait_for_probe(&registry, "a").await.healthy);
        assert!(!wait_for_probe(&registry, "b").await.healthy);

        // B recovers on a later round.
        probe.up.insert("b".into(), true);
        monitor.tick();
        for _ in 0..100 {
            if registry.get("b").unwrap().is_healthy() {
                return;
            }
            time::sleep(Duration::from_millis(5)).await;
        }
        panic!("b never recovered");
    }

    #[tokio::test]
    async fn test_reconcile_registers_known_servers() {
        let registry = Arc::new(CandidateRegistry::new());
        let directory = Arc::new(StaticDirectory::new());
        directory.add("a");
        directory.add("survival");
        let monitor = HealthMonitor::new(
            registry.clone(),
            directory.clone(),
            Arc::new(ScriptedProbe::default()),
            config_with(&["a", "b"], 200),
        );

        assert_eq!(monitor.reconcile(), 1);
        assert!(registry.contains("a"));
        assert!(!registry.contains("b"));
        assert!(!registry.contains("survival"));

        // Declared before it was reachable; picked up once the proxy knows it.
        directory.add("b");
        assert_eq!(monitor.reconcile(), 1);
        assert!(registry.contains("b"));
        assert!(registry.get("b").unwrap().is_healthy());

        assert_eq!(monitor.reconcile(), 0);
    }

    #[tokio::test]
    async fn test_reconcile_prunes_untracked_candidates() {
        let registry = Arc::new(CandidateRegistry::new());
        let directory = Arc::new(StaticDirectory::new());
        directory.add("a");
        directory.add("b");
        let config = config_with(&["a", "b"], 200);
        let monitor = HealthMonitor::new(
            registry.clone(),
            directory,
            Arc::new(ScriptedProbe::default()),
            config.clone(),
        );
        assert_eq!(monitor.reconcile(), 2);

        // A round that loaded the old list re-registered "a" after the swap.
        let mut swapped = GuardConfig::clone(&config.load());
        swapped.lobby_servers = vec!["b".into()];
        config.store(Arc::new(swapped));
        registry.register("a");

        assert_eq!(monitor.reconcile(), 0);
        assert!(!registry.contains("a"));
        assert!(registry.contains("b"));
    }

    #[tokio::test]
    async fn test_panicking_probe_is_isolated() {
        let (registry, _, monitor) = monitor(&["sync", "async", "fine"], Arc::new(PanickingProbe));

        monitor.tick();

        assert!(!wait_for_probe(&registry, "sync").await.healthy);
        assert!(!wait_for_probe(&registry, "async").await.healthy);
        assert!(wait_for_probe(&registry, "fine").await.healthy);

        // The monitor keeps working after probe failures.
        monitor.tick();
        assert_eq!(registry.len(), 3);
    }

    #[tokio::test]
    async fn test_hanging_probe_times_out() {
        let registry = Arc::new(CandidateRegistry::new());
        let directory = Arc::new(StaticDirectory::new());
        directory.add("a");
        let monitor = HealthMonitor::new(
            registry.clone(),
            directory,
            Arc::new(HangingProbe),
            config_with(&["a"], 20),
        );

        monitor.tick();

        assert!(!wait_for_probe(&registry, "a").await.healthy);
    }

    #[tokio::test]
    async fn test_disabled_checks_still_reconcile() {
        let registry = Arc::new(CandidateRegistry::new());
        let directory = Arc::new(StaticDirectory::new());
        directory.add("a");
        let config = config_with(&["a"], 200);
        let mut disabled = GuardConfig::clone(&config.load());
        disabled.health_check.enabled = false;
        config.store(Arc::new(disabled));

        let monitor = HealthMonitor::new(
            registry.clone(),
            directory,
            Arc::new(ScriptedProbe::default()),
            config,
        );
        monitor.tick();
        time::sleep(Duration::from_millis(30)).await;

        let record = registry.get("a").unwrap().health();
        assert!(record.healthy);
        assert!(record.last_probe_at.is_none());
    }

    #[tokio::test]
    async fn test_spawned_monitor_stops_on_shutdown() {
        let shutdown = Shutdown::new();
        let scheduler = Scheduler::new(shutdown.clone());
        let (registry, _, monitor) = monitor(&["a"], Arc::new(ScriptedProbe::default()));

        let handle = monitor.spawn(&scheduler);
        assert!(!wait_for_probe(&registry, "a").await.healthy);

        shutdown.trigger();
        time::sleep(Duration::from_millis(50)).await;
        assert!(handle.is_finished());
    }
}

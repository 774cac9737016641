//! Lobby guard: the decision surface used by command and event handlers.
//!
//! # Responsibilities
//! - Own the candidate registry, flood limiter and per-feature cooldowns
//! - Start the health monitor and cooldown sweeper, stop them on shutdown
//! - Translate backend lifecycle notifications into registry changes
//! - Answer selection, admission and cooldown queries without I/O

use std::sync::{Arc, Mutex};
use std::time::Duration;

use arc_swap::ArcSwap;
use uuid::Uuid;

use crate::config::{FeatureConfig, GuardConfig};
use crate::health::active::HealthMonitor;
use crate::health::probe::Probe;
use crate::lifecycle::{Scheduler, Shutdown, TaskHandle};
use crate::load_balancer::candidate::CandidateServer;
use crate::load_balancer::least_players::LeastPlayers;
use crate::load_balancer::registry::CandidateRegistry;
use crate::load_balancer::selector::LobbySelector;
use crate::load_balancer::BackendDirectory;
use crate::observability::metrics;
use crate::security::cooldown::{Cooldown, CooldownCache};
use crate::security::rate_limit::{Admission, AdmissionLimiter};

/// Stable player identity.
pub type PlayerId = Uuid;

const COOLDOWN_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// A feature protected by its own cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Report,
    Helpop,
}

impl Feature {
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Report => "report",
            Feature::Helpop => "helpop",
        }
    }

    fn settings(self, config: &GuardConfig) -> &FeatureConfig {
        match self {
            Feature::Report => &config.report,
            Feature::Helpop => &config.helpop,
        }
    }
}

/// Where a player asking for the lobby should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyRoute {
    /// The player is already on a lobby candidate.
    AlreadyInLobby,
    /// No healthy candidate exists.
    Unavailable,
    Connect(CandidateServer),
}

pub struct LobbyGuard {
    config: Arc<ArcSwap<GuardConfig>>,
    registry: Arc<CandidateRegistry>,
    selector: LobbySelector,
    limiter: AdmissionLimiter<PlayerId>,
    reports: Arc<CooldownCache<PlayerId>>,
    helpops: Arc<CooldownCache<PlayerId>>,
    shutdown: Shutdown,
    tasks: Mutex<Vec<TaskHandle>>,
}

impl LobbyGuard {
    /// Build the guard and start its background tasks.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start(
        config: GuardConfig,
        directory: Arc<dyn BackendDirectory>,
        probe: Arc<dyn Probe>,
    ) -> Self {
        let config = Arc::new(ArcSwap::from_pointee(config));
        let registry = Arc::new(CandidateRegistry::new());
        let shutdown = Shutdown::new();
        let scheduler = Scheduler::new(shutdown.clone());

        let monitor = HealthMonitor::new(
            registry.clone(),
            directory.clone(),
            probe,
            config.clone(),
        );
        // Register what is already known so selection works before the first tick.
        monitor.reconcile();
        let monitor_task = monitor.spawn(&scheduler);

        let reports = Arc::new(CooldownCache::new());
        let helpops = Arc::new(CooldownCache::new());
        let sweeper_task = {
            let reports = reports.clone();
            let helpops = helpops.clone();
            scheduler.run_every(COOLDOWN_SWEEP_INTERVAL, move || {
                let purged = reports.purge_expired() + helpops.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "Purged expired cooldowns");
                }
            })
        };

        tracing::info!(
            candidates = registry.len(),
            lobby_servers = ?config.load().lobby_servers,
            "Lobby guard started"
        );

        Self {
            selector: LobbySelector::new(registry.clone(), directory, Box::new(LeastPlayers::new())),
            limiter: AdmissionLimiter::new(scheduler),
            config,
            registry,
            reports,
            helpops,
            shutdown,
            tasks: Mutex::new(vec![monitor_task, sweeper_task]),
        }
    }

    // --- Lobby selection ---

    pub fn select_best(&self) -> Option<CandidateServer> {
        self.selector.select_best()
    }

    pub fn is_candidate(&self, id: &str) -> bool {
        self.selector.is_candidate(id)
    }

    /// Decide where a player on `current` (if anywhere) goes when asking for the lobby.
    pub fn route_to_lobby(&self, current: Option<&str>) -> LobbyRoute {
        if current.is_some_and(|id| self.is_candidate(id)) {
            return LobbyRoute::AlreadyInLobby;
        }
        match self.select_best() {
            Some(candidate) => LobbyRoute::Connect(candidate),
            None => LobbyRoute::Unavailable,
        }
    }

    /// Current candidates in registration order.
    pub fn candidates(&self) -> Vec<CandidateServer> {
        self.registry.snapshot()
    }

    // --- Backend lifecycle ---

    /// The proxy registered a backend. Only configured lobby servers become candidates.
    pub fn on_backend_available(&self, id: &str) {
        if !self.config.load().is_lobby_server(id) {
            return;
        }
        if self.registry.register(id) {
            tracing::info!(candidate = %id, "Lobby candidate registered");
        }
    }

    /// The proxy unregistered a backend.
    pub fn on_backend_removed(&self, id: &str) {
        if self.registry.unregister(id) {
            tracing::info!(candidate = %id, "Lobby candidate unregistered");
        }
    }

    // --- Flood protection ---

    /// Count one command by `identity`. Safe to call from any thread.
    pub fn admission_check(&self, identity: PlayerId) -> Admission {
        let config = self.config.load();
        let verdict = self.limiter.check(identity, &config.anti_flood);

        if verdict == Admission::Terminate {
            tracing::warn!(
                player = %identity,
                limit = config.anti_flood.command_limit,
                window_ms = config.anti_flood.clear_time_ms,
                "Command flood cap exceeded, terminating session"
            );
            metrics::record_admission_termination();
        }
        verdict
    }

    /// Disconnect reason for [`Admission::Terminate`].
    pub fn kick_message(&self) -> String {
        self.config.load().anti_flood.message.clone()
    }

    // --- Cooldowns ---

    pub fn feature_enabled(&self, feature: Feature) -> bool {
        feature.settings(&self.config.load()).enabled
    }

    /// Try to use `feature` with an explicit cooldown `duration`.
    pub fn cooldown_try_acquire(
        &self,
        feature: Feature,
        identity: PlayerId,
        duration: Duration,
    ) -> Cooldown {
        let verdict = self.cooldowns(feature).try_acquire(identity, duration);

        if let Cooldown::Active { remaining } = verdict {
            tracing::debug!(
                player = %identity,
                feature = feature.as_str(),
                remaining_ms = remaining.as_millis() as u64,
                "Feature on cooldown"
            );
            metrics::record_cooldown_denial(feature.as_str());
        }
        verdict
    }

    /// Try to use `feature` with its configured cooldown.
    pub fn feature_cooldown(&self, feature: Feature, identity: PlayerId) -> Cooldown {
        let duration = feature.settings(&self.config.load()).cooldown();
        self.cooldown_try_acquire(feature, identity, duration)
    }

    fn cooldowns(&self, feature: Feature) -> &CooldownCache<PlayerId> {
        match feature {
            Feature::Report => &self.reports,
            Feature::Helpop => &self.helpops,
        }
    }

    // --- Configuration & lifecycle ---

    /// Swap in a new configuration.
    ///
    /// Candidates no longer listed as lobby servers are dropped; newly listed
    /// ones are picked up by the monitor's next reconcile. The probe interval
    /// keeps the value it had at start.
    pub fn apply_config(&self, config: GuardConfig) {
        let config = Arc::new(config);
        self.config.store(config.clone());

        for candidate in self.registry.snapshot() {
            if !config.is_lobby_server(&candidate.id) && self.registry.unregister(&candidate.id) {
                tracing::info!(candidate = %candidate.id, "Lobby server no longer configured, unregistered");
            }
        }
        tracing::info!("Configuration applied");
    }

    pub fn config(&self) -> Arc<GuardConfig> {
        self.config.load_full()
    }

    /// Stop the monitor, the sweeper and every pending flood window timer.
    pub fn shutdown(&self) {
        if self.shutdown.is_triggered() {
            return;
        }
        self.shutdown.trigger();
        for task in self.tasks.lock().expect("guard task list poisoned").drain(..) {
            task.cancel();
        }
        tracing::info!("Lobby guard stopped");
    }
}

impl Drop for LobbyGuard {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//! Configuration file watcher for hot reload.
//!
//! Editors often emit several events per save, so a reload is forwarded only
//! when it differs from the last configuration sent. The log line names the
//! sections that changed.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GuardConfig;

/// Watches the configuration file and forwards validated, changed configs.
pub struct ConfigWatcher {
    path: PathBuf,
    last_applied: Arc<Mutex<GuardConfig>>,
    update_tx: mpsc::UnboundedSender<GuardConfig>,
}

impl ConfigWatcher {
    /// `current` is the configuration already in effect; reloads are diffed
    /// against it.
    pub fn new(path: &Path, current: GuardConfig) -> (Self, mpsc::UnboundedReceiver<GuardConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                last_applied: Arc::new(Mutex::new(current)),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let last_applied = self.last_applied;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    match load_config(&path) {
                        Ok(new_config) => {
                            let mut last = last_applied.lock().expect("config watcher mutex poisoned");
                            if let Some(update) = diff_reload(&mut last, new_config) {
                                let _ = tx.send(update);
                            }
                        }
                        Err(e) => tracing::error!(
                            error = %e,
                            "Config reload rejected, keeping current configuration"
                        ),
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Replace `last` with `next` when they differ and return the config to apply.
fn diff_reload(last: &mut GuardConfig, next: GuardConfig) -> Option<GuardConfig> {
    let sections = changed_sections(last, &next);
    if sections.is_empty() {
        tracing::debug!("Config file touched without changes");
        return None;
    }

    if next.health_check.interval_ms != last.health_check.interval_ms {
        tracing::warn!("health_check.interval_ms only takes effect on restart");
    }
    if next.backends != last.backends {
        tracing::warn!("backends address book only takes effect on restart");
    }

    tracing::info!(?sections, "Config reloaded");
    *last = next.clone();
    Some(next)
}

/// Names of the top-level sections that differ between two configs.
pub fn changed_sections(old: &GuardConfig, new: &GuardConfig) -> Vec<&'static str> {
    let mut sections = Vec::new();
    if old.lobby_servers != new.lobby_servers {
        sections.push("lobby_servers");
    }
    if old.backends != new.backends {
        sections.push("backends");
    }
    if old.health_check != new.health_check {
        sections.push("health_check");
    }
    if old.anti_flood != new.anti_flood {
        sections.push("anti_flood");
    }
    if old.report != new.report {
        sections.push("report");
    }
    if old.helpop != new.helpop {
        sections.push("helpop");
    }
    if old.observability != new.observability {
        sections.push("observability");
    }
    sections
}

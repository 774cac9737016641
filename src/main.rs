//! Lobby guard host.
//!
//! Runs the lobby core against the backends listed in the config file, probing
//! them over TCP, and logs the routing target until asked to stop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;

use lobby_guard::config::loader::load_config;
use lobby_guard::config::watcher::ConfigWatcher;
use lobby_guard::health::probe::TcpProbe;
use lobby_guard::lifecycle::signals::wait_for_shutdown_signal;
use lobby_guard::load_balancer::directory::StaticDirectory;
use lobby_guard::observability::{logging, metrics};
use lobby_guard::{GuardConfig, LobbyGuard};

#[derive(Parser)]
#[command(name = "lobby-guard")]
#[command(about = "Lobby selection and flood protection for a game proxy", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How often to log the current routing target, in seconds.
    #[arg(long, default_value_t = 10)]
    status_interval: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("lobby-guard v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        lobby_servers = ?config.lobby_servers,
        backends = config.backends.len(),
        probe_interval_ms = config.health_check.interval_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let directory = Arc::new(StaticDirectory::from_backends(&config.backends));
    let probe = Arc::new(TcpProbe::from_config(&config.backends));
    let guard = LobbyGuard::start(config, directory, probe);

    // Keep the watcher alive for the lifetime of the loop.
    let (_watcher, mut config_updates) = match &cli.config {
        Some(path) => {
            let current = GuardConfig::clone(&guard.config());
            let (watcher, updates) = ConfigWatcher::new(path, current);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let mut status = tokio::time::interval(Duration::from_secs(cli.status_interval.max(1)));
    let signal = wait_for_shutdown_signal();
    tokio::pin!(signal);

    loop {
        tokio::select! {
            _ = &mut signal => break,
            Some(new_config) = config_updates.recv() => guard.apply_config(new_config),
            _ = status.tick() => match guard.select_best() {
                Some(candidate) => tracing::info!(lobby = %candidate.id, "Routing target"),
                None => tracing::warn!(
                    candidates = guard.candidates().len(),
                    "No lobby available"
                ),
            },
        }
    }

    guard.shutdown();
    tracing::info!("Shutdown complete");
    Ok(())
}

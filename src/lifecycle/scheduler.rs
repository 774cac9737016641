//! Delayed and recurring tasks on the tokio runtime.
//!
//! Every task listens to the shared [`Shutdown`] signal and exits when it
//! fires; each one can also be cancelled on its own through [`TaskHandle`].

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::lifecycle::Shutdown;

/// Spawns timer-driven tasks onto the runtime it was created in.
///
/// Only construction needs a runtime context; scheduling works from any
/// thread, including plain OS threads outside the runtime.
#[derive(Debug, Clone)]
pub struct Scheduler {
    runtime: Handle,
    shutdown: Shutdown,
}

/// Handle to a scheduled task. Dropping it does not cancel the task.
#[derive(Debug)]
pub struct TaskHandle {
    handle: JoinHandle<()>,
}

impl TaskHandle {
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Scheduler {
    /// Bind to the current runtime.
    ///
    /// # Panics
    /// When called outside a tokio runtime.
    pub fn new(shutdown: Shutdown) -> Self {
        Self {
            runtime: Handle::current(),
            shutdown,
        }
    }

    /// Run `task` once after `delay`.
    pub fn run_after<F>(&self, delay: Duration, task: F) -> TaskHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut shutdown = self.shutdown.subscribe();
        let already_down = self.shutdown.is_triggered();

        let handle = self.runtime.spawn(async move {
            if already_down {
                return;
            }
            tokio::select! {
                _ = time::sleep(delay) => task.await,
                _ = shutdown.recv() => {}
            }
        });

        TaskHandle { handle }
    }

    /// Run `task` every `period`, starting immediately. A zero period is
    /// treated as one millisecond.
    ///
    /// Ticks missed because the runtime was busy are delayed, not bunched up.
    pub fn run_every<F>(&self, period: Duration, mut task: F) -> TaskHandle
    where
        F: FnMut() + Send + 'static,
    {
        let mut shutdown = self.shutdown.subscribe();
        let already_down = self.shutdown.is_triggered();

        let handle = self.runtime.spawn(async move {
            if already_down {
                return;
            }
            let mut ticker = time::interval(period.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => task(),
                    _ = shutdown.recv() => break,
                }
            }
        });

        TaskHandle { handle }
    }
}

//! Command flood limiter.
//!
//! Each identity gets a fixed window that opens on its first action. Up to
//! `command_limit` actions fit in a window; the next one removes the window
//! and tells the caller to terminate the session. The window closes on its
//! own when its one-shot timer fires, after which the identity starts over.
//!
//! A window that opens right after a termination is a normal fresh window;
//! the limiter does not remember past offences.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::Instant;

use crate::config::AntiFloodConfig;
use crate::lifecycle::Scheduler;

/// Verdict for one guarded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// Cap exceeded: the caller must disconnect this identity.
    Terminate,
}

impl Admission {
    pub fn is_allowed(self) -> bool {
        self == Admission::Allowed
    }
}

#[derive(Debug)]
struct Window {
    count: u32,
    /// Distinguishes this window from earlier ones for the same identity, so
    /// an old expiry timer never closes a newer window.
    generation: u64,
    expires_at: Instant,
}

/// Identity-keyed fixed-window action counter.
pub struct AdmissionLimiter<K> {
    windows: Arc<DashMap<K, Window>>,
    next_generation: AtomicU64,
    scheduler: Scheduler,
}

impl<K> AdmissionLimiter<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            next_generation: AtomicU64::new(0),
            scheduler,
        }
    }

    /// Count one action by `identity` against `policy`.
    ///
    /// The increment and the cap comparison happen under the identity's map
    /// entry lock. A disabled policy allows everything and records nothing.
    pub fn check(&self, identity: K, policy: &AntiFloodConfig) -> Admission {
        if !policy.enabled {
            return Admission::Allowed;
        }

        let now = Instant::now();
        let window_len = policy.window();
        let mut armed = None;

        let verdict = match self.windows.entry(identity.clone()) {
            Entry::Occupied(mut occupied) => {
                let window = occupied.get_mut();
                if window.expires_at <= now {
                    // Lapsed but its timer has not run yet.
                    let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                    *window = Window {
                        count: 0,
                        generation,
                        expires_at: now + window_len,
                    };
                    armed = Some(generation);
                }
                window.count += 1;

                if window.count > policy.command_limit {
                    occupied.remove();
                    armed = None;
                    Admission::Terminate
                } else {
                    Admission::Allowed
                }
            }
            Entry::Vacant(vacant) => {
                if policy.command_limit == 0 {
                    Admission::Terminate
                } else {
                    let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                    vacant.insert(Window {
                        count: 1,
                        generation,
                        expires_at: now + window_len,
                    });
                    armed = Some(generation);
                    Admission::Allowed
                }
            }
        };

        if let Some(generation) = armed {
            self.arm_expiry(identity, generation, window_len);
        }
        verdict
    }

    fn arm_expiry(&self, identity: K, generation: u64, after: Duration) {
        let windows = self.windows.clone();
        self.scheduler.run_after(after, async move {
            windows.remove_if(&identity, |_, window| window.generation == generation);
        });
    }

    /// Actions counted in `identity`'s open window, 0 if none.
    pub fn count(&self, identity: &K) -> u32 {
        let now = Instant::now();
        self.windows
            .get(identity)
            .filter(|w| w.expires_at > now)
            .map(|w| w.count)
            .unwrap_or(0)
    }

    /// Number of identities with a window in the map.
    pub fn active_windows(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;
    use tokio::time;

    fn policy(limit: u32, window_ms: u64) -> AntiFloodConfig {
        AntiFloodConfig {
            enabled: true,
            command_limit: limit,
            clear_time_ms: window_ms,
            message: "flood".into(),
        }
    }

    fn limiter() -> AdmissionLimiter<&'static str> {
        AdmissionLimiter::new(Scheduler::new(Shutdown::new()))
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cap_then_terminate() {
        let limiter = limiter();
        let policy = policy(10, 1000);

        for _ in 0..10 {
            assert_eq!(limiter.check("alice", &policy), Admission::Allowed);
        }
        assert_eq!(limiter.count(&"alice"), 10);

        assert_eq!(limiter.check("alice", &policy), Admission::Terminate);
        assert_eq!(limiter.active_windows(), 0);

        // Eviction means the next action opens a fresh window.
        assert_eq!(limiter.check("alice", &policy), Admission::Allowed);
        assert_eq!(limiter.count(&"alice"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_expiry_resets() {
        let limiter = limiter();
        let policy = policy(10, 1000);

        for _ in 0..10 {
            limiter.check("alice", &policy);
        }

        time::sleep(Duration::from_millis(1001)).await;
        settle().await;
        assert_eq!(limiter.active_windows(), 0);

        assert_eq!(limiter.check("alice", &policy), Admission::Allowed);
        assert_eq!(limiter.count(&"alice"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_identities_are_independent() {
        let limiter = limiter();
        let policy = policy(3, 1000);

        for _ in 0..3 {
            limiter.check("alice", &policy);
        }
        assert_eq!(limiter.check("alice", &policy), Admission::Terminate);
        assert_eq!(limiter.check("bob", &policy), Admission::Allowed);
        assert_eq!(limiter.count(&"bob"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_old_timer_does_not_close_new_window() {
        let limiter = limiter();
        let policy = policy(2, 1000);

        // Window 1 opens at t=0 and is evicted at t=500.
        limiter.check("alice", &policy);
        time::sleep(Duration::from_millis(500)).await;
        limiter.check("alice", &policy);
        assert_eq!(limiter.check("alice", &policy), Admission::Terminate);

        // Window 2 opens at t=500; window 1's timer fires at t=1000.
        limiter.check("alice", &policy);
        time::sleep(Duration::from_millis(600)).await;
        settle().await;

        assert_eq!(limiter.count(&"alice"), 1);
        assert_eq!(limiter.check("alice", &policy), Admission::Allowed);
        assert_eq!(limiter.check("alice", &policy), Admission::Terminate);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_records_nothing() {
        let limiter = limiter();
        let mut policy = policy(1, 1000);
        policy.enabled = false;

        for _ in 0..100 {
            assert!(limiter.check("alice", &policy).is_allowed());
        }
        assert_eq!(limiter.active_windows(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checks_respect_cap() {
        let limiter = Arc::new(limiter());
        let policy = Arc::new(policy(10, 60_000));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let limiter = limiter.clone();
            let policy = policy.clone();
            tasks.push(tokio::spawn(async move {
                (0..5)
                    .filter(|_| limiter.check("alice", &policy).is_allowed())
                    .count()
            }));
        }

        let mut allowed = 0;
        for task in tasks {
            allowed += task.await.unwrap();
        }

        // 40 actions: a window admits 10, the 11th terminates and evicts,
        // the next window admits 10 more, and so on.
        let terminated = 40 - allowed;
        assert_eq!(terminated, 3);
        assert_eq!(allowed, 37);
    }
}

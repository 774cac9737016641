//! Per-identity cooldowns for spam-prone features.
//!
//! One [`CooldownCache`] instance exists per feature, so cooldowns never leak
//! across features. An entry is logically gone once its deadline passes;
//! [`CooldownCache::purge_expired`] reclaims the memory.

use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::Instant;

/// Result of trying to use a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cooldown {
    Ready,
    /// Still cooling down; `remaining` is the wait before the next use.
    Active { remaining: Duration },
}

impl Cooldown {
    pub fn is_ready(self) -> bool {
        self == Cooldown::Ready
    }

    /// Remaining wait, zero when ready.
    pub fn remaining(self) -> Duration {
        match self {
            Cooldown::Ready => Duration::ZERO,
            Cooldown::Active { remaining } => remaining,
        }
    }
}

/// Single-slot expiring timestamp per identity.
pub struct CooldownCache<K> {
    next_allowed: DashMap<K, Instant>,
}

impl<K: Eq + Hash> fmt::Debug for CooldownCache<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CooldownCache")
            .field("entries", &self.next_allowed.len())
            .finish()
    }
}

impl<K: Eq + Hash> Default for CooldownCache<K> {
    fn default() -> Self {
        Self {
            next_allowed: DashMap::new(),
        }
    }
}

impl<K: Eq + Hash> CooldownCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to use the feature now.
    ///
    /// On success the identity's next allowed time becomes `now + duration`.
    /// On failure nothing changes. A zero `duration` disables the cooldown:
    /// always ready, nothing stored.
    pub fn try_acquire(&self, identity: K, duration: Duration) -> Cooldown {
        if duration.is_zero() {
            return Cooldown::Ready;
        }

        let now = Instant::now();
        match self.next_allowed.entry(identity) {
            Entry::Occupied(mut occupied) => {
                let next = *occupied.get();
                if now < next {
                    Cooldown::Active {
                        remaining: next - now,
                    }
                } else {
                    occupied.insert(now + duration);
                    Cooldown::Ready
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(now + duration);
                Cooldown::Ready
            }
        }
    }

    /// Remaining wait for `identity` without touching state.
    pub fn remaining(&self, identity: &K) -> Option<Duration> {
        let now = Instant::now();
        self.next_allowed
            .get(identity)
            .map(|next| *next)
            .filter(|next| now < *next)
            .map(|next| next - now)
    }

    /// Drop every entry whose deadline has passed. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.next_allowed.len();
        self.next_allowed.retain(|_, next| now < *next);
        before.saturating_sub(self.next_allowed.len())
    }

    pub fn len(&self) -> usize {
        self.next_allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next_allowed.is_empty()
    }
}

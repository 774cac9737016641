//! Candidate health record.
//!
//! # States
//! - Healthy: candidate may receive routed players
//! - Unhealthy: candidate excluded from selection
//!
//! A candidate starts healthy before its first probe. Every completed probe
//! flips the flag directly; there is no hysteresis. Results are ordered by
//! completion time: a probe that completed before the recorded one is dropped.

use tokio::time::Instant;

/// Latest reachability outcome for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthRecord {
    pub healthy: bool,
    /// Completion time of the probe that produced `healthy`. `None` before the first probe.
    pub last_probe_at: Option<Instant>,
}

/// What happened when a probe result was offered to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeUpdate {
    /// Recorded, health flag unchanged.
    Unchanged,
    /// Recorded, health flag flipped.
    Transitioned,
    /// Dropped: a later-completing probe was already recorded.
    Stale,
}

impl HealthRecord {
    /// Record for a candidate that has not been probed yet.
    pub fn unprobed() -> Self {
        Self {
            healthy: true,
            last_probe_at: None,
        }
    }

    /// Apply a probe result that completed at `completed_at`.
    pub fn apply(&mut self, healthy: bool, completed_at: Instant) -> ProbeUpdate {
        if matches!(self.last_probe_at, Some(last) if completed_at < last) {
            return ProbeUpdate::Stale;
        }

        let transitioned = self.healthy != healthy;
        self.healthy = healthy;
        self.last_probe_at = Some(completed_at);

        if transitioned {
            ProbeUpdate::Transitioned
        } else {
            ProbeUpdate::Unchanged
        }
    }
}

impl Default for HealthRecord {
    fn default() -> Self {
        Self::unprobed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_unprobed_is_healthy() {
        let record = HealthRecord::unprobed();
        assert!(record.healthy);
        assert!(record.last_probe_at.is_none());
    }

    #[test]
    fn test_transitions() {
        let mut record = HealthRecord::unprobed();
        let t0 = Instant::now();

        assert_eq!(record.apply(true, t0), ProbeUpdate::Unchanged);
        assert_eq!(record.apply(false, t0 + Duration::from_millis(1)), ProbeUpdate::Transitioned);
        assert!(!record.healthy);
        assert_eq!(record.apply(true, t0 + Duration::from_millis(2)), ProbeUpdate::Transitioned);
        assert!(record.healthy);
    }

    #[test]
    fn test_stale_completion_is_dropped() {
        let mut record = HealthRecord::unprobed();
        let early = Instant::now();
        let late = early + Duration::from_millis(500);

        // The later probe lands first, then the earlier one arrives.
        record.apply(false, late);
        assert_eq!(record.apply(true, early), ProbeUpdate::Stale);

        assert!(!record.healthy);
        assert_eq!(record.last_probe_at, Some(late));
    }
}

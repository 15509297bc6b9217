//! Engine metrics collection.
//!
//! Aggregate counters only: no session ids, no recovered text. Safe to
//! expose on a monitoring endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Engine metrics collector.
pub struct LeakMetrics {
    /// Collector start time
    start_time: Instant,
    /// Sessions created
    sessions_created: AtomicU64,
    /// Sessions that reached a terminal state
    sessions_completed: AtomicU64,
    /// Observations accepted into a session
    observations_accepted: AtomicU64,
    /// Observations rejected (stale, replayed, out of range)
    observations_rejected: AtomicU64,
    /// Characters appended across all sessions
    characters_recovered: AtomicU64,
    /// Render contexts produced
    pages_generated: AtomicU64,
}

impl LeakMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            sessions_created: AtomicU64::new(0),
            sessions_completed: AtomicU64::new(0),
            observations_accepted: AtomicU64::new(0),
            observations_rejected: AtomicU64::new(0),
            characters_recovered: AtomicU64::new(0),
            pages_generated: AtomicU64::new(0),
        }
    }

    /// Increment created session count.
    pub fn increment_sessions_created(&self) {
        self.sessions_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment completed session count.
    pub fn increment_sessions_completed(&self) {
        self.sessions_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment accepted observation count.
    pub fn increment_observations_accepted(&self) {
        self.observations_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment rejected observation count.
    pub fn increment_observations_rejected(&self) {
        self.observations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Add to the recovered character counter.
    pub fn add_characters_recovered(&self, count: u64) {
        self.characters_recovered.fetch_add(count, Ordering::Relaxed);
    }

    /// Increment generated page count.
    pub fn increment_pages_generated(&self) {
        self.pages_generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Get uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get created session count.
    pub fn sessions_created(&self) -> u64 {
        self.sessions_created.load(Ordering::Relaxed)
    }

    /// Get completed session count.
    pub fn sessions_completed(&self) -> u64 {
        self.sessions_completed.load(Ordering::Relaxed)
    }

    /// Get accepted observation count.
    pub fn observations_accepted(&self) -> u64 {
        self.observations_accepted.load(Ordering::Relaxed)
    }

    /// Get rejected observation count.
    pub fn observations_rejected(&self) -> u64 {
        self.observations_rejected.load(Ordering::Relaxed)
    }

    /// Get recovered character count.
    pub fn characters_recovered(&self) -> u64 {
        self.characters_recovered.load(Ordering::Relaxed)
    }

    /// Get generated page count.
    pub fn pages_generated(&self) -> u64 {
        self.pages_generated.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.uptime_secs(),
            sessions_created: self.sessions_created(),
            sessions_completed: self.sessions_completed(),
            observations_accepted: self.observations_accepted(),
            observations_rejected: self.observations_rejected(),
            characters_recovered: self.characters_recovered(),
            pages_generated: self.pages_generated(),
        }
    }

    /// Format metrics as a simple text report.
    pub fn format_report(&self) -> String {
        let snapshot = self.snapshot();

        format!(
            r#"Leak Engine Metrics
===================
Uptime: {} seconds

Sessions:
  Created:   {}
  Completed: {}

Observations:
  Accepted: {}
  Rejected: {}

Output:
  Characters Recovered: {}
  Pages Generated:      {}
"#,
            snapshot.uptime_secs,
            snapshot.sessions_created,
            snapshot.sessions_completed,
            snapshot.observations_accepted,
            snapshot.observations_rejected,
            snapshot.characters_recovered,
            snapshot.pages_generated,
        )
    }
}

impl Default for LeakMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of all metrics at a point in time.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Seconds since the collector was created
    pub uptime_secs: u64,
    /// Sessions created
    pub sessions_created: u64,
    /// Sessions that reached a terminal state
    pub sessions_completed: u64,
    /// Observations accepted
    pub observations_accepted: u64,
    /// Observations rejected
    pub observations_rejected: u64,
    /// Characters appended across all sessions
    pub characters_recovered: u64,
    /// Render contexts produced
    pub pages_generated: u64,
}

impl MetricsSnapshot {
    /// Fraction of created sessions that completed.
    pub fn completion_rate(&self) -> f64 {
        if self.sessions_created == 0 {
            0.0
        } else {
            self.sessions_completed as f64 / self.sessions_created as f64
        }
    }

    /// Fraction of observations that were rejected.
    pub fn rejection_rate(&self) -> f64 {
        let total = self.observations_accepted + self.observations_rejected;
        if total == 0 {
            0.0
        } else {
            self.observations_rejected as f64 / total as f64
        }
    }
}

//! RAM-only session tracking.
//!
//! Sessions exist only in memory and expire automatically once idle. The
//! store owns every [`LeakState`]; callers get value copies in and out,
//! never references into the map. One mutex per session serializes
//! transitions for an id while distinct ids proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use rand::Rng;

use crate::config::LeakSetup;
use crate::error::{Error, Result};
use crate::metrics::LeakMetrics;

use super::state::{BatchObservation, LeakState};

/// Cleanup pass interval for [`LeakStore::run_cleanup`].
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

struct Entry {
    state: LeakState,
    last_activity: Instant,
}

/// In-memory store of active leak sessions.
pub struct LeakStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Entry>>>>,
    max_sessions: usize,
    session_timeout: Duration,
    metrics: Arc<LeakMetrics>,
}

impl LeakStore {
    /// Create a new store.
    pub fn new(max_sessions: usize, session_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            session_timeout,
            metrics: Arc::new(LeakMetrics::new()),
        }
    }

    /// Create and track a session under a fresh random id.
    pub fn create(&self, setup: LeakSetup, font_path: impl Into<String>) -> LeakState {
        self.insert(LeakState::new(Self::mint_id(), setup, font_path))
    }

    /// Track a caller-built session; externally assigned ids stay usable.
    ///
    /// At capacity, a handful of expired entries are evicted to make room.
    pub fn insert(&self, state: LeakState) -> LeakState {
        let mut sessions = self.sessions.write();

        if sessions.len() >= self.max_sessions {
            let expired: Vec<_> = sessions
                .iter()
                .filter(|(_, e)| e.lock().last_activity.elapsed() > self.session_timeout)
                .map(|(id, _)| id.clone())
                .take(10)
                .collect();
            for id in expired {
                sessions.remove(&id);
            }
        }

        sessions.insert(
            state.id.clone(),
            Arc::new(Mutex::new(Entry {
                state: state.clone(),
                last_activity: Instant::now(),
            })),
        );
        self.metrics.increment_sessions_created();

        state
    }

    fn mint_id() -> String {
        let mut rng = rand::thread_rng();
        format!("{:016x}", rng.gen::<u64>())
    }

    /// Value copy of a session's current state.
    pub fn get(&self, id: &str) -> Option<LeakState> {
        let entry = self.sessions.read().get(id).cloned()?;
        let entry = entry.lock();
        Some(entry.state.clone())
    }

    /// Apply one observation to a session, returning the advanced copy.
    pub fn advance(&self, id: &str, observed_index: usize, observed_step: usize) -> Result<LeakState> {
        self.apply(id, |state| state.advance(observed_index, observed_step))
    }

    /// Apply a batched page's observations, returning the advanced copy.
    pub fn advance_batch(&self, id: &str, observations: &[BatchObservation]) -> Result<LeakState> {
        self.apply(id, |state| state.advance_batch(observations))
    }

    fn apply(
        &self,
        id: &str,
        transition: impl FnOnce(&LeakState) -> Result<LeakState>,
    ) -> Result<LeakState> {
        // Clone the Arc so the map lock is released before the transition
        let entry = self
            .sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))?;

        let mut entry = entry.lock();
        match transition(&entry.state) {
            Ok(next) => {
                let recovered = next.reconstruction.len() - entry.state.reconstruction.len();
                self.metrics.increment_observations_accepted();
                self.metrics.add_characters_recovered(recovered as u64);
                if next.is_complete() && !entry.state.is_complete() {
                    self.metrics.increment_sessions_completed();
                }

                entry.state = next.clone();
                entry.last_activity = Instant::now();
                Ok(next)
            }
            Err(e) => {
                self.metrics.increment_observations_rejected();
                tracing::debug!("rejected observation for session {}: {}", id, e);
                Err(e)
            }
        }
    }

    /// Stop tracking a session.
    pub fn remove(&self, id: &str) {
        self.sessions.write().remove(id);
    }

    /// Number of tracked sessions.
    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Drop sessions idle longer than the timeout. Returns how many were
    /// removed.
    pub fn purge_expired(&self) -> usize {
        let expired: Vec<_> = {
            let sessions = self.sessions.read();
            sessions
                .iter()
                .filter(|(_, e)| e.lock().last_activity.elapsed() > self.session_timeout)
                .map(|(id, _)| id.clone())
                .collect()
        };

        if !expired.is_empty() {
            let mut sessions = self.sessions.write();
            for id in &expired {
                sessions.remove(id);
            }
        }
        expired.len()
    }

    /// Periodic cleanup loop for a serving layer to spawn.
    pub async fn run_cleanup(&self) {
        loop {
            tokio::time::sleep(CLEANUP_INTERVAL).await;

            let removed = self.purge_expired();
            if removed > 0 {
                tracing::debug!("cleaned up {} expired sessions", removed);
            }
        }
    }

    /// Aggregate engine metrics.
    pub fn metrics(&self) -> &LeakMetrics {
        &self.metrics
    }
}

//! Per-leak session state and its transition function.
//!
//! A [`LeakState`] is plain data owned by whatever store tracks it. Every
//! transition takes a state by reference and returns an advanced copy, so
//! the engine never holds a reference into the store and replays can be
//! rejected instead of silently reordered.

use serde::{Deserialize, Serialize};

use crate::config::{Browser, LeakSetup};
use crate::encoder::StepMap;
use crate::error::{Error, Result};

/// Lifecycle of a leak session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeakStatus {
    /// Still accepting observations
    Active,
    /// Target length reached or the no-match sentinel observed
    Complete,
}

/// One resolved slot of a batched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchObservation {
    /// Position block the observed width fell in
    pub position: usize,
    /// Candidate index the observed width mapped to
    pub char_idx: usize,
}

/// State of one in-progress exfiltration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakState {
    /// Session identity, assigned externally
    pub id: String,
    /// Text recovered so far, append-only
    pub reconstruction: String,
    /// Cursor into the step map, monotonically non-decreasing
    pub step: usize,
    /// Per-step sentinel code points
    pub step_map: StepMap,
    /// Path of the probe font served to this session
    pub font_path: String,
    /// Maximum number of characters to recover
    pub length: usize,
    /// Known prefix the reconstruction was seeded with
    pub prefix: String,
    /// Drop out-of-alphabet observations instead of failing
    pub strip: bool,
    /// Browser compatibility target
    pub browser: Browser,
    /// Lifecycle marker
    pub status: LeakStatus,
    /// Setup parameters the session was created with, immutable
    pub setup: LeakSetup,
}

impl LeakState {
    /// Create a session from validated setup.
    ///
    /// The reconstruction is seeded with the setup's known prefix and the
    /// step map reserves one sentinel per leakable position.
    pub fn new(id: impl Into<String>, setup: LeakSetup, font_path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reconstruction: setup.prefix.clone(),
            step: 0,
            step_map: StepMap::for_length(setup.length),
            font_path: font_path.into(),
            length: setup.length,
            prefix: setup.prefix.clone(),
            strip: setup.strip,
            browser: setup.browser,
            status: LeakStatus::Active,
            setup,
        }
    }

    /// Whether the session reached a terminal state.
    pub fn is_complete(&self) -> bool {
        self.status == LeakStatus::Complete
    }

    /// Characters recovered beyond the seeded prefix.
    pub fn recovered(&self) -> &str {
        &self.reconstruction[self.prefix.len()..]
    }

    /// Apply one observation, returning the advanced copy.
    ///
    /// The observation must carry the session's current step; anything else
    /// is stale, replayed, or forged and fails with
    /// [`Error::StepMismatch`]. An index equal to the alphabet size is the
    /// no-match sentinel: it completes the session without touching the
    /// reconstruction. Indices addressing no slot at all are dropped when
    /// `strip` is set, rejected with [`Error::IndexOutOfRange`] otherwise.
    /// The step cursor advances on every accepted observation, which is what
    /// makes replays of an already-applied pair rejections rather than
    /// double-appends.
    pub fn advance(&self, observed_index: usize, observed_step: usize) -> Result<LeakState> {
        if self.is_complete() {
            return Err(Error::SessionComplete(self.id.clone()));
        }
        if observed_step != self.step {
            return Err(Error::StepMismatch {
                observed: observed_step,
                expected: self.step,
            });
        }

        let mut next = self.clone();
        let sentinel = self.setup.alphabet.sentinel();

        if observed_index == sentinel {
            next.status = LeakStatus::Complete;
        } else {
            match self.setup.alphabet.char_at(observed_index) {
                Some(c) => next.reconstruction.push(c),
                None if self.strip => {}
                None => {
                    return Err(Error::IndexOutOfRange {
                        index: observed_index,
                        alphabet_size: sentinel,
                    })
                }
            }
            if next.reconstruction.len() >= next.length {
                next.status = LeakStatus::Complete;
            }
        }

        next.step += 1;
        Ok(next)
    }

    /// Apply a batched page's observations, returning the advanced copy.
    ///
    /// A position on a batched page doubles as the absolute step it
    /// resolves, so the batch is folded through [`LeakState::advance`] in
    /// position order: contiguity, replay rejection, sentinel handling and
    /// completion all fall out of the single-step rules, and the step cursor
    /// ends advanced by the batch size.
    pub fn advance_batch(&self, observations: &[BatchObservation]) -> Result<LeakState> {
        let mut ordered = observations.to_vec();
        ordered.sort_by_key(|o| o.position);

        let mut state = self.clone();
        for obs in ordered {
            state = state.advance(obs.char_idx, obs.position)?;
            if state.is_complete() {
                break;
            }
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;

    fn abcd_setup(length: usize) -> LeakSetup {
        LeakSetup {
            alphabet: Alphabet::new("ABCD").unwrap(),
            length,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_session_seeds_prefix() {
        let setup = LeakSetup {
            prefix: "flag{".into(),
            ..abcd_setup(32)
        };
        let state = LeakState::new("s-1", setup, "fonts/probe.woff");

        assert_eq!(state.reconstruction, "flag{");
        assert_eq!(state.recovered(), "");
        assert_eq!(state.step, 0);
        assert_eq!(state.step_map.len(), 32);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_lifecycle_to_sentinel_completion() {
        // alphabet "ABCD", length 3: observations A, B, then no-match
        let state = LeakState::new("s-1", abcd_setup(3), "fonts/probe.woff");

        let state = state.advance(0, 0).unwrap();
        let state = state.advance(1, 1).unwrap();
        let state = state.advance(4, 2).unwrap();

        assert_eq!(state.reconstruction, "AB");
        assert!(state.is_complete());
        assert_eq!(state.step, 3);
    }

    #[test]
    fn test_completion_by_length() {
        let state = LeakState::new("s-1", abcd_setup(2), "fonts/probe.woff");

        let state = state.advance(2, 0).unwrap();
        assert!(!state.is_complete());

        let state = state.advance(3, 1).unwrap();
        assert_eq!(state.reconstruction, "CD");
        assert!(state.is_complete());
    }

    #[test]
    fn test_sentinel_never_mutates_reconstruction() {
        let state = LeakState::new("s-1", abcd_setup(5), "fonts/probe.woff");
        let state = state.advance(0, 0).unwrap();

        let done = state.advance(4, 1).unwrap();
        assert_eq!(done.reconstruction, state.reconstruction);
        assert!(done.is_complete());
        assert_eq!(done.step, 2);
    }

    #[test]
    fn test_replay_is_rejected_not_double_appended() {
        let state = LeakState::new("s-1", abcd_setup(5), "fonts/probe.woff");
        let advanced = state.advance(0, 0).unwrap();

        // Same observation against the advanced session
        let err = advanced.advance(0, 0).unwrap_err();
        assert_eq!(
            err,
            Error::StepMismatch {
                observed: 0,
                expected: 1
            }
        );
        assert_eq!(advanced.reconstruction, "A");
    }

    #[test]
    fn test_out_of_order_rejected() {
        let state = LeakState::new("s-1", abcd_setup(5), "fonts/probe.woff");
        assert!(state.advance(0, 2).is_err());
    }

    #[test]
    fn test_stray_index_dropped_when_stripping() {
        let state = LeakState::new("s-1", abcd_setup(5), "fonts/probe.woff");

        let state = state.advance(17, 0).unwrap();
        assert_eq!(state.reconstruction, "");
        // the channel stays aligned
        assert_eq!(state.step, 1);
    }

    #[test]
    fn test_stray_index_rejected_without_strip() {
        let setup = LeakSetup {
            strip: false,
            ..abcd_setup(5)
        };
        let state = LeakState::new("s-1", setup, "fonts/probe.woff");

        let err = state.advance(17, 0).unwrap_err();
        assert_eq!(
            err,
            Error::IndexOutOfRange {
                index: 17,
                alphabet_size: 4
            }
        );
    }

    #[test]
    fn test_complete_session_rejects_observations() {
        let state = LeakState::new("s-1", abcd_setup(1), "fonts/probe.woff");
        let done = state.advance(0, 0).unwrap();
        assert!(done.is_complete());

        let err = done.advance(1, 1).unwrap_err();
        assert_eq!(err, Error::SessionComplete("s-1".into()));
    }

    #[test]
    fn test_batch_advances_by_batch_size() {
        let state = LeakState::new("s-1", abcd_setup(8), "fonts/probe.woff");

        let batch = [
            BatchObservation {
                position: 1,
                char_idx: 1,
            },
            BatchObservation {
                position: 0,
                char_idx: 0,
            },
            BatchObservation {
                position: 2,
                char_idx: 3,
            },
        ];
        let state = state.advance_batch(&batch).unwrap();

        assert_eq!(state.reconstruction, "ABD");
        assert_eq!(state.step, 3);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_batch_stops_at_sentinel() {
        let state = LeakState::new("s-1", abcd_setup(8), "fonts/probe.woff");

        let batch = [
            BatchObservation {
                position: 0,
                char_idx: 2,
            },
            BatchObservation {
                position: 1,
                char_idx: 4,
            },
            // padding past the sentinel; must not be appended
            BatchObservation {
                position: 2,
                char_idx: 0,
            },
        ];
        let state = state.advance_batch(&batch).unwrap();

        assert_eq!(state.reconstruction, "C");
        assert!(state.is_complete());
        assert_eq!(state.step, 2);
    }

    #[test]
    fn test_batch_replay_rejected() {
        let state = LeakState::new("s-1", abcd_setup(8), "fonts/probe.woff");
        let batch = [
            BatchObservation {
                position: 0,
                char_idx: 0,
            },
            BatchObservation {
                position: 1,
                char_idx: 1,
            },
        ];

        let advanced = state.advance_batch(&batch).unwrap();
        let err = advanced.advance_batch(&batch).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(advanced.reconstruction, "AB");
    }

    #[test]
    fn test_prefix_counts_toward_length() {
        let setup = LeakSetup {
            prefix: "AB".into(),
            ..abcd_setup(3)
        };
        let state = LeakState::new("s-1", setup, "fonts/probe.woff");

        let state = state.advance(3, 0).unwrap();
        assert_eq!(state.reconstruction, "ABD");
        assert_eq!(state.recovered(), "D");
        assert!(state.is_complete());
    }

    #[test]
    fn test_state_serde_round_trip() {
        let state = LeakState::new("s-1", abcd_setup(4), "fonts/probe.woff");
        let state = state.advance(0, 0).unwrap();

        let json = serde_json::to_string(&state).unwrap();
        let back: LeakState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}

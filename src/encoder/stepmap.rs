//! Per-step sentinel code points.
//!
//! Each exfiltration step reserves one code point whose CSS character escape
//! is woven into that step's selector rules. The escape makes step `k`'s
//! rules textually distinct from step `k±1`'s, so rule or resource caching
//! cannot carry a match across step boundaries. Sentinels are selector
//! material, never leaked content.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// First sentinel code point. Everything from here upward is outside the
/// single-byte alphabet range, so a step escape can never collide with a
/// candidate glyph.
pub const STEP_SENTINEL_BASE: u32 = 0x100;

/// Ordered per-step sentinel code points.
///
/// Fixed at session creation; the length bounds how many steps a
/// single-character-per-step session can issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepMap(Vec<u32>);

impl StepMap {
    /// Wrap an explicit sequence of code points.
    pub fn new(points: Vec<u32>) -> Self {
        Self(points)
    }

    /// One sentinel per leakable position, counting up from the base point.
    pub fn for_length(length: usize) -> Self {
        Self((0..length as u32).map(|i| STEP_SENTINEL_BASE + i).collect())
    }

    /// Number of steps the map can issue.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map holds no steps at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Code point reserved for `step`, if the map covers it.
    pub fn get(&self, step: usize) -> Option<u32> {
        self.0.get(step).copied()
    }

    /// CSS character escape for one step's sentinel: a backslash followed by
    /// the lowercase hexadecimal code point.
    pub fn escape(&self, step: usize) -> Result<String> {
        let point = self.0.get(step).ok_or(Error::StepOutOfRange {
            step,
            max: self.0.len(),
        })?;
        Ok(format!("\\{point:x}"))
    }

    /// Escapes for steps `0..idx_max`, for pages that self-advance through
    /// several steps without a reload.
    pub fn escapes(&self, idx_max: usize) -> Result<Vec<String>> {
        if idx_max > self.0.len() {
            return Err(Error::StepOutOfRange {
                step: idx_max,
                max: self.0.len(),
            });
        }
        (0..idx_max).map(|step| self.escape(step)).collect()
    }
}

impl Default for StepMap {
    fn default() -> Self {
        Self(vec![STEP_SENTINEL_BASE])
    }
}

//! Candidate alphabet validation.
//!
//! Every leaked position is probed against one ordered set of candidate
//! characters. The set is normalized once at setup time: duplicates are
//! dropped (first occurrence wins) and every character must be a printable
//! single-byte character, since the width tables address candidates by index
//! and the probe font only carries single-byte glyphs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Every printable ASCII character plus space, in the order sessions probe
/// them by default: digits, lowercase, uppercase, punctuation, space.
pub const DEFAULT_ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ ";

/// Ordered set of distinct candidate characters for one leaked position.
///
/// Immutable after construction. The index of a character in the alphabet is
/// the index the width tables encode; the slot one past the last character is
/// the no-match sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// Normalize and validate a raw character sequence.
    ///
    /// Duplicates are dropped with the first occurrence winning. Fails with
    /// [`Error::Config`] on an empty result, a character outside the
    /// single-byte range, or a non-printable character other than space.
    pub fn new(raw: &str) -> Result<Self> {
        let mut seen = [false; 256];
        let mut chars = Vec::with_capacity(raw.len());

        for c in raw.chars() {
            let point = c as u32;
            if point >= 256 {
                return Err(Error::config(format!(
                    "alphabet character {c:?} is outside the single-byte range"
                )));
            }
            if !(c.is_ascii_graphic() || c == ' ') {
                return Err(Error::config(format!(
                    "alphabet character {c:?} is not printable"
                )));
            }
            if !seen[point as usize] {
                seen[point as usize] = true;
                chars.push(c);
            }
        }

        if chars.is_empty() {
            return Err(Error::config("alphabet must contain at least one character"));
        }

        Ok(Self { chars })
    }

    /// Number of candidate characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false for a constructed alphabet; present for completeness.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Index of the no-match sentinel slot (one past the last candidate).
    pub fn sentinel(&self) -> usize {
        self.chars.len()
    }

    /// Candidate character at `idx`, if the index addresses one.
    pub fn char_at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    /// Whether `c` is one of the candidates.
    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    /// Candidates in probe order.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        // DEFAULT_ALPHABET is already distinct and printable
        Self {
            chars: DEFAULT_ALPHABET.chars().collect(),
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Alphabet {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Alphabet::new(&value)
    }
}

impl From<Alphabet> for String {
    fn from(value: Alphabet) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_preserves_order() {
        let alphabet = Alphabet::new("abcabcx").unwrap();
        assert_eq!(alphabet.to_string(), "abcx");
        assert_eq!(alphabet.len(), 4);
    }

    #[test]
    fn test_rejects_non_single_byte() {
        assert!(Alphabet::new("ab\u{0394}").is_err());
    }

    #[test]
    fn test_rejects_control_and_whitespace() {
        assert!(Alphabet::new("ab\t").is_err());
        assert!(Alphabet::new("ab\n").is_err());
        // Latin-1 but not printable ASCII
        assert!(Alphabet::new("ab\u{00e9}").is_err());
    }

    #[test]
    fn test_accepts_space() {
        let alphabet = Alphabet::new("a b").unwrap();
        assert!(alphabet.contains(' '));
        assert_eq!(alphabet.len(), 3);
    }

    #[test]
    fn test_rejects_empty() {
        assert!(Alphabet::new("").is_err());
    }

    #[test]
    fn test_default_alphabet() {
        let alphabet = Alphabet::default();
        // 10 digits + 52 letters + 32 punctuation + space
        assert_eq!(alphabet.len(), 95);
        assert_eq!(alphabet.char_at(0), Some('0'));
        assert_eq!(alphabet.char_at(94), Some(' '));
        // Normalizing the constant is a no-op
        assert_eq!(Alphabet::new(DEFAULT_ALPHABET).unwrap(), alphabet);
    }

    #[test]
    fn test_sentinel_is_one_past_end() {
        let alphabet = Alphabet::new("ABCD").unwrap();
        assert_eq!(alphabet.sentinel(), 4);
        assert_eq!(alphabet.char_at(3), Some('D'));
        assert_eq!(alphabet.char_at(4), None);
    }

    #[test]
    fn test_serde_round_trip() {
        let alphabet = Alphabet::new("ABCD").unwrap();
        let json = serde_json::to_string(&alphabet).unwrap();
        assert_eq!(json, "\"ABCD\"");
        let back: Alphabet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, alphabet);
    }
}

//! Word pairs: candidates, their order-independent identity, and history records.

use super::CanonicalRootId;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order-independent identity of a word pair.
///
/// Words are trimmed, lowercased and sorted, so `(a, b)` and `(b, a)` produce
/// the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    /// Builds the normalized key for two words.
    #[must_use]
    pub fn new(word1: &str, word2: &str) -> Self {
        let a = normalize_word(word1);
        let b = normalize_word(word2);
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    /// The lexicographically smaller word.
    #[must_use]
    pub fn first(&self) -> &str {
        &self.first
    }

    /// The lexicographically larger word.
    #[must_use]
    pub fn second(&self) -> &str {
        &self.second
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}", self.first, self.second)
    }
}

/// Trims and lowercases a word for storage and comparison.
#[must_use]
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// A fresh pair offered for posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePair {
    /// Shared canonical root.
    pub root: CanonicalRootId,
    /// First word.
    pub word1: String,
    /// Second word.
    pub word2: String,
    /// Gloss of the root, if known.
    pub gloss: Option<String>,
}

impl CandidatePair {
    /// Creates a validated candidate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if either word is empty or both words
    /// are the same after normalization.
    pub fn new(
        root: CanonicalRootId,
        word1: &str,
        word2: &str,
        gloss: Option<String>,
    ) -> Result<Self> {
        let word1 = normalize_word(word1);
        let word2 = normalize_word(word2);
        if word1.is_empty() || word2.is_empty() {
            return Err(Error::InvalidInput("pair words must be non-empty".into()));
        }
        if word1 == word2 {
            return Err(Error::InvalidInput(format!(
                "pair words must differ, got '{word1}' twice"
            )));
        }
        Ok(Self {
            root,
            word1,
            word2,
            gloss,
        })
    }

    /// Order-independent identity of this pair.
    #[must_use]
    pub fn key(&self) -> PairKey {
        PairKey::new(&self.word1, &self.word2)
    }
}

impl fmt::Display for CandidatePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} & {} (root: {}", self.word1, self.word2, self.root)?;
        if let Some(gloss) = &self.gloss {
            write!(f, ", \"{gloss}\"")?;
        }
        write!(f, ")")
    }
}

/// A pair that was posted externally. Written once, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedPairRecord {
    /// Smaller word of the pair key.
    pub word1: String,
    /// Larger word of the pair key.
    pub word2: String,
    /// Root the pair was posted under.
    pub root: String,
    /// Identifier assigned by the posting service.
    pub external_post_id: String,
    /// When the post was recorded.
    pub posted_at: DateTime<Utc>,
}

/// Failure history for one word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFailureRecord {
    /// Normalized word.
    pub word: String,
    /// Number of failures, at least 1.
    pub failure_count: u32,
    /// Time of the most recent failure.
    pub last_failure: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_order_independent() {
        assert_eq!(PairKey::new("salary", "salad"), PairKey::new("salad", "salary"));
        let key = PairKey::new(" Salary ", "salad");
        assert_eq!(key.first(), "salad");
        assert_eq!(key.second(), "salary");
        assert_eq!(key.to_string(), "salad + salary");
    }

    #[test]
    fn test_candidate_rejects_identical_words() {
        let result = CandidatePair::new(CanonicalRootId::new("SAL"), "Salt", "salt", None);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_candidate_rejects_empty_word() {
        let result = CandidatePair::new(CanonicalRootId::new("SAL"), "  ", "salt", None);
        assert!(result.is_err());
    }

    #[test]
    fn test_candidate_display() {
        let pair = CandidatePair::new(
            CanonicalRootId::new("SAL"),
            "salary",
            "salad",
            Some("salt".into()),
        )
        .unwrap();
        assert_eq!(pair.to_string(), "salary & salad (root: SAL, \"salt\")");
        assert_eq!(pair.key(), PairKey::new("salad", "salary"));
    }
}

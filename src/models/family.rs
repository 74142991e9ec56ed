//! Root families and their serialized snapshot forms.

use super::CanonicalRootId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The modern words descending from one canonical root.
///
/// The consensus builder only materializes a family once it is attested by
/// enough independent sources and has at least two words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootFamily {
    /// Canonical root id.
    pub canonical_id: CanonicalRootId,
    /// Distinct lowercase words, kept sorted.
    pub words: BTreeSet<String>,
    /// Short meaning of the root, if one was found.
    pub gloss: Option<String>,
    /// Number of distinct sources that attested any word of the family.
    pub source_count: usize,
}

impl RootFamily {
    /// Creates a family from an id and words.
    #[must_use]
    pub fn new<I, S>(canonical_id: CanonicalRootId, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            canonical_id,
            words: words.into_iter().map(Into::into).collect(),
            gloss: None,
            source_count: 0,
        }
    }

    /// Sets the gloss.
    #[must_use]
    pub fn with_gloss(mut self, gloss: impl Into<String>) -> Self {
        self.gloss = Some(gloss.into());
        self
    }

    /// Sets the source count.
    #[must_use]
    pub const fn with_source_count(mut self, source_count: usize) -> Self {
        self.source_count = source_count;
        self
    }

    /// Number of unordered word pairs: `n·(n-1)/2`.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        let n = self.words.len();
        n * n.saturating_sub(1) / 2
    }

    /// Iterates every unordered word pair, each in lexicographic order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.words.iter().enumerate().flat_map(move |(i, first)| {
            self.words
                .iter()
                .skip(i + 1)
                .map(move |second| (first.as_str(), second.as_str()))
        })
    }
}

/// On-disk form of one family in a snapshot.
///
/// Older snapshots stored a bare word list; newer ones carry consensus
/// metadata. Both are resolved into [`RootFamily`] once, at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredFamily {
    /// Flat list of words with no corroboration data.
    Legacy(Vec<String>),
    /// Consensus-built family.
    Verified {
        /// Member words.
        words: Vec<String>,
        /// Root gloss.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gloss: Option<String>,
        /// Independent source count.
        #[serde(alias = "sources", default = "legacy_source_count")]
        source_count: usize,
    },
}

const fn legacy_source_count() -> usize {
    1
}

impl StoredFamily {
    /// Returns true for the flat legacy form.
    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Resolves the stored form into a family under `canonical_id`.
    ///
    /// Legacy entries carry no corroboration data and resolve with a
    /// source count of 1.
    #[must_use]
    pub fn into_family(self, canonical_id: CanonicalRootId) -> RootFamily {
        match self {
            Self::Legacy(words) => RootFamily::new(canonical_id, words)
                .with_source_count(legacy_source_count()),
            Self::Verified {
                words,
                gloss,
                source_count,
            } => RootFamily {
                canonical_id,
                words: words.into_iter().collect(),
                gloss,
                source_count,
            },
        }
    }
}

impl From<&RootFamily> for StoredFamily {
    fn from(family: &RootFamily) -> Self {
        Self::Verified {
            words: family.words.iter().cloned().collect(),
            gloss: family.gloss.clone(),
            source_count: family.source_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_enumerates_combinations() {
        let family = RootFamily::new(CanonicalRootId::new("HABJAN"), ["have", "heave", "hover"]);
        let pairs: Vec<_> = family.pairs().collect();
        assert_eq!(
            pairs,
            vec![("have", "heave"), ("have", "hover"), ("heave", "hover")]
        );
        assert_eq!(family.pair_count(), 3);
    }

    #[test]
    fn test_pair_count_small_families() {
        let empty = RootFamily::new(CanonicalRootId::new("X"), Vec::<String>::new());
        assert_eq!(empty.pair_count(), 0);
        let single = RootFamily::new(CanonicalRootId::new("X"), ["one"]);
        assert_eq!(single.pair_count(), 0);
        assert_eq!(single.pairs().count(), 0);
    }

    #[test]
    fn test_stored_family_accepts_both_shapes() {
        let legacy: StoredFamily = serde_json::from_str(r#"["salad", "salary"]"#).unwrap();
        assert!(legacy.is_legacy());
        let family = legacy.into_family(CanonicalRootId::new("SAL"));
        assert_eq!(family.source_count, 1);
        assert!(family.gloss.is_none());

        let verified: StoredFamily =
            serde_json::from_str(r#"{"words": ["salad", "salary"], "gloss": "salt", "sources": 3}"#)
                .unwrap();
        assert!(!verified.is_legacy());
        let family = verified.into_family(CanonicalRootId::new("SAL"));
        assert_eq!(family.source_count, 3);
        assert_eq!(family.gloss.as_deref(), Some("salt"));
    }

    #[test]
    fn test_stored_family_serializes_verified_shape() {
        let family = RootFamily::new(CanonicalRootId::new("SAL"), ["salary", "salad"])
            .with_source_count(2);
        let json = serde_json::to_value(StoredFamily::from(&family)).unwrap();
        assert_eq!(json["words"], serde_json::json!(["salad", "salary"]));
        assert_eq!(json["source_count"], 2);
        assert!(json.get("gloss").is_none());
    }
}

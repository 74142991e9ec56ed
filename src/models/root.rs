//! Canonical root identifiers and canonicalization outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical identity of one reconstructed root.
///
/// An uppercase token with hyphens removed and an optional `(N)` numbered
/// sense suffix, e.g. `BHEL`, `HABJAN`, `WER(2)`. All ablaut and orthographic
/// variants of a root share one id.
///
/// [`CanonicalRootId::new`] does not validate; ids produced by
/// [`crate::services::RootCanonicalizer`] are the trusted path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalRootId(String);

impl CanonicalRootId {
    /// Wraps an id that is already in canonical form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the id without its numbered sense suffix.
    ///
    /// `WER(2)` yields `WER`; ids without a suffix are returned whole.
    #[must_use]
    pub fn base(&self) -> &str {
        split_sense_suffix(&self.0).0
    }

    /// Returns the numbered sense, if the id carries one.
    #[must_use]
    pub fn sense(&self) -> Option<u32> {
        split_sense_suffix(&self.0).1
    }
}

/// Splits a trailing `(N)` suffix off a root string.
pub(crate) fn split_sense_suffix(root: &str) -> (&str, Option<u32>) {
    let Some(stripped) = root.strip_suffix(')') else {
        return (root, None);
    };
    let Some(open) = stripped.rfind('(') else {
        return (root, None);
    };
    let digits = &stripped[open + 1..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return (root, None);
    }
    digits
        .parse()
        .map_or((root, None), |n| (&stripped[..open], Some(n)))
}

impl fmt::Display for CanonicalRootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CanonicalRootId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CanonicalRootId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Why a raw root string was refused a canonical id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// Nothing left after stripping labels and markers.
    Empty,
    /// The remainder has no alphabetic characters at all.
    NoLetters,
    /// The remainder is purely numeric.
    Numeric,
    /// Fewer than three alphabetic characters.
    TooShort {
        /// Number of letters found.
        letters: usize,
    },
    /// A three-letter common word or morphological fragment (`CAR`, `BOX`).
    MorphologicalFragment(String),
    /// A stoplisted token: language names, hedges, discourse markers.
    NonRootToken(String),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::NoLetters => write!(f, "no letters"),
            Self::Numeric => write!(f, "numeric"),
            Self::TooShort { letters } => write!(f, "too short ({letters} letters)"),
            Self::MorphologicalFragment(token) => write!(f, "morphological fragment '{token}'"),
            Self::NonRootToken(token) => write!(f, "non-root token '{token}'"),
        }
    }
}

impl RejectionReason {
    /// Short label used for metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::NoLetters => "no_letters",
            Self::Numeric => "numeric",
            Self::TooShort { .. } => "too_short",
            Self::MorphologicalFragment(_) => "morphological_fragment",
            Self::NonRootToken(_) => "non_root_token",
        }
    }
}

/// Outcome of canonicalizing one raw root string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Canonicalization {
    /// The root was accepted under this id.
    Accepted(CanonicalRootId),
    /// The root was refused.
    Rejected(RejectionReason),
}

impl Canonicalization {
    /// Returns true if the root was accepted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Returns the accepted id, if any.
    #[must_use]
    pub const fn as_id(&self) -> Option<&CanonicalRootId> {
        match self {
            Self::Accepted(id) => Some(id),
            Self::Rejected(_) => None,
        }
    }

    /// Converts into the accepted id, discarding the rejection reason.
    #[must_use]
    pub fn accepted(self) -> Option<CanonicalRootId> {
        match self {
            Self::Accepted(id) => Some(id),
            Self::Rejected(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_and_sense() {
        let id = CanonicalRootId::new("WER(2)");
        assert_eq!(id.base(), "WER");
        assert_eq!(id.sense(), Some(2));

        let id = CanonicalRootId::new("BHEL");
        assert_eq!(id.base(), "BHEL");
        assert_eq!(id.sense(), None);
    }

    #[test]
    fn test_split_sense_suffix_ignores_non_numeric() {
        assert_eq!(split_sense_suffix("WER(x)"), ("WER(x)", None));
        assert_eq!(split_sense_suffix("WER()"), ("WER()", None));
        assert_eq!(split_sense_suffix("(12)"), ("", Some(12)));
    }

    #[test]
    fn test_canonicalization_accessors() {
        let accepted = Canonicalization::Accepted(CanonicalRootId::new("GHEN"));
        assert!(accepted.is_accepted());
        assert_eq!(accepted.as_id().map(CanonicalRootId::as_str), Some("GHEN"));

        let rejected = Canonicalization::Rejected(RejectionReason::Empty);
        assert!(!rejected.is_accepted());
        assert!(rejected.accepted().is_none());
    }

    #[test]
    fn test_rejection_display() {
        assert_eq!(
            RejectionReason::TooShort { letters: 2 }.to_string(),
            "too short (2 letters)"
        );
        assert_eq!(
            RejectionReason::MorphologicalFragment("CAR".into()).as_str(),
            "morphological_fragment"
        );
    }
}

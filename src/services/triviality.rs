//! Detection of affix-only pairings.

use crate::models::root::split_sense_suffix;

/// Shortest cleaned root that is considered at all.
const MIN_ROOT_CHARS: usize = 3;

/// Flags word pairs related by plain prefix/suffix derivation.
///
/// A pair is trivial when the root's cleaned spelling is still visible in
/// both words and one word is literally built on the other, as in
/// `car`/`cart`. Pairs like `salary`/`salad` share the root letters but
/// diverged, so they are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrivialityFilter;

impl TrivialityFilter {
    /// Creates the filter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns true if the pair is affix-trivial under `root`.
    ///
    /// Empty roots, roots shorter than three characters after cleaning and
    /// empty words are never trivial.
    #[must_use]
    pub fn is_trivial(&self, root: &str, word1: &str, word2: &str) -> bool {
        let Some(root) = clean_root(root) else {
            return false;
        };
        let w1 = word1.trim().to_lowercase();
        let w2 = word2.trim().to_lowercase();
        if w1.is_empty() || w2.is_empty() {
            return false;
        }

        let visible = w1.contains(&root) && w2.contains(&root);
        let affixed = w1.contains(&w2) || w2.contains(&w1);
        visible && affixed
    }
}

/// Lowercases the root and drops `-`, `*` and any `(N)` suffix.
fn clean_root(root: &str) -> Option<String> {
    let (base, _) = split_sense_suffix(root.trim());
    let cleaned: String = base
        .chars()
        .filter(|c| *c != '-' && *c != '*')
        .collect::<String>()
        .to_lowercase();
    (cleaned.chars().count() >= MIN_ROOT_CHARS).then_some(cleaned)
}

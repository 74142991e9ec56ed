//! Etymology text scanning.
//!
//! Finds root mentions in free-text etymologies using an ordered pattern
//! list, most specific first, and picks up a short gloss next to each match.
//!
//! # Example
//!
//! ```rust,ignore
//! use etymoroot::services::EtymologyExtractor;
//! use etymoroot::models::DictionaryEntry;
//!
//! let extractor = EtymologyExtractor::default();
//! let entry = DictionaryEntry::new("salary", vec!["From Latin salarium, from PIE *sal- (\"salt\").".into()]);
//! let mentions = extractor.extract(&entry);
//! ```

use crate::config::ExtractionSettings;
use crate::models::{DictionaryEntry, RawRootMention};
use crate::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use unicode_normalization::char::is_combining_mark;

/// Character class for reconstructed forms: letters, combining marks,
/// hyphens and laryngeal subscripts.
const ROOT_CHARS: &str = r"[\p{L}\p{M}\-ₐ₀₁₂₃₄₅₆₇₈₉]";

/// Built-in patterns as `(name, template)`; `{R}` expands to [`ROOT_CHARS`].
const BUILTIN_PATTERNS: &[(&str, &str)] = &[
    // Proto-language reconstructions
    ("proto_reconstruction", r"Proto-[A-Za-z-]+\s+\*({R}+)"),
    ("pie_reconstruction", r"PIE\s+\*({R}+)"),
    ("pie_long_reconstruction", r"Proto-Indo-European\s+\*({R}+)"),
    // Any other asterisked form
    ("asterisked", r"\*({R}{3,})\b"),
    // Explicit root statements
    ("root_statement", r"from\s+(?:the\s+)?root\s+\*?({R}{3,})"),
    ("ultimately_from", r"ultimately\s+from\s+\*({R}{3,})"),
    // Sanskrit/Latin roots followed by a parenthetical
    ("sanskrit_root", r"Sanskrit\s+([a-zA-Z\-]{3,})\s*\("),
    ("latin_root", r"Latin\s+([a-zA-Z\-]{3,})\s*\("),
    // Well-known root spellings after "from"
    (
        "known_root",
        r"from\s+([a-zA-Z\-]*(?:ghen|bhel|wegh|dʰeh|gwem|treud|stel|bʰer|ǵʰen)[a-zA-Z\-]*)",
    ),
];

/// Ultra-common headwords that never get interesting etymologies.
const SKIP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
    "our", "out", "day", "get", "has", "him", "his", "how", "its", "may", "new", "now", "old",
    "see", "two", "who", "boy", "did", "she", "use", "way", "oil", "sit", "set", "run", "eat",
];

/// Captures that are language names or prose, not roots.
const NON_ROOT_CAPTURES: &[&str] = &[
    "dutch", "german", "english", "french", "latin", "greek", "sanskrit", "middle", "old",
    "proto", "ancient", "early", "cognate", "related", "compare", "see", "also", "word", "term",
    "meaning", "sense", "literally", "originally", "probably", "possibly", "perhaps", "scots",
    "welsh", "irish", "norse", "germanic", "celtic", "slavic", "saterland", "frisian",
    "lithuanian", "latvian", "polish", "influenced", "borrowed", "akin",
];

/// Gloss shapes accepted right after a root, most specific first.
const GLOSS_TAILS: &[&str] = &[
    r#"^[-*]*\s*\(["“]([^"”]+)["”]\)"#,
    r#"^[-*]*\s*["“]([^"”]+)["”]"#,
    r"^[-*]*\s*\(([^)]+)\)",
];

const MIN_ROOT_CHARS: usize = 3;
const MAX_ROOT_CHARS: usize = 25;
const MAX_GLOSS_CHARS: usize = 50;

/// A named, compiled root pattern. The first capture group is the root.
#[derive(Debug, Clone)]
pub struct RootPattern {
    name: String,
    regex: Regex,
}

impl RootPattern {
    /// Compiles a case-insensitive pattern; `{R}` expands to the root
    /// character class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the pattern does not compile or has
    /// no capture group.
    pub fn new(name: &str, template: &str) -> Result<Self> {
        let source = format!("(?i){}", template.replace("{R}", ROOT_CHARS));
        let regex = Regex::new(&source)
            .map_err(|e| Error::InvalidInput(format!("invalid root pattern '{name}': {e}")))?;
        if regex.captures_len() < 2 {
            return Err(Error::InvalidInput(format!(
                "root pattern '{name}' has no capture group"
            )));
        }
        Ok(Self {
            name: name.to_string(),
            regex,
        })
    }

    /// Pattern name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A root found in one etymology text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRoot {
    /// Cleaned root text.
    pub root: String,
    /// Gloss found next to it.
    pub gloss: Option<String>,
    /// Name of the first pattern that found it.
    pub pattern: String,
}

/// Scans etymology prose for root mentions.
///
/// Owns its compiled patterns; build one and share it by reference.
#[derive(Debug, Clone)]
pub struct EtymologyExtractor {
    patterns: Vec<RootPattern>,
    gloss_tails: Vec<Regex>,
    settings: ExtractionSettings,
}

impl Default for EtymologyExtractor {
    fn default() -> Self {
        Self::new(ExtractionSettings::default())
    }
}

impl EtymologyExtractor {
    /// Creates an extractor with the built-in pattern list.
    #[must_use]
    pub fn new(settings: ExtractionSettings) -> Self {
        let patterns = BUILTIN_PATTERNS
            .iter()
            .filter_map(|(name, template)| {
                RootPattern::new(name, template)
                    .inspect_err(|e| tracing::error!(error = %e, "Skipping built-in root pattern"))
                    .ok()
            })
            .collect();
        Self::with_patterns(settings, patterns)
    }

    /// Creates an extractor with an explicit pattern list, in priority order.
    #[must_use]
    pub fn with_patterns(settings: ExtractionSettings, patterns: Vec<RootPattern>) -> Self {
        let gloss_tails = GLOSS_TAILS
            .iter()
            .filter_map(|tail| {
                Regex::new(tail)
                    .inspect_err(|e| tracing::error!(error = %e, "Skipping gloss pattern"))
                    .ok()
            })
            .collect();
        Self {
            patterns,
            gloss_tails,
            settings,
        }
    }

    /// The patterns in priority order.
    #[must_use]
    pub fn patterns(&self) -> &[RootPattern] {
        &self.patterns
    }

    /// Returns true if a headword is worth scanning.
    #[must_use]
    pub fn is_valid_word(&self, word: &str) -> bool {
        let word = word.trim();
        let len = word.chars().count();
        if len < self.settings.min_word_length || len > self.settings.max_word_length {
            return false;
        }
        if !word.chars().all(char::is_alphabetic) {
            return false;
        }
        !SKIP_WORDS.contains(&word.to_lowercase().as_str())
    }

    /// Finds the distinct roots in one etymology text, in pattern priority order.
    #[must_use]
    pub fn extract_roots(&self, text: &str) -> Vec<ExtractedRoot> {
        let mut found: Vec<ExtractedRoot> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for pattern in &self.patterns {
            for captures in pattern.regex.captures_iter(text) {
                let Some(matched) = captures.get(1) else {
                    continue;
                };
                let Some(root) = clean_root(matched.as_str()) else {
                    continue;
                };

                let gloss = self.gloss_after(&text[matched.end()..]);
                if let Some(&i) = index.get(&root) {
                    if found[i].gloss.is_none() {
                        found[i].gloss = gloss;
                    }
                    continue;
                }
                index.insert(root.clone(), found.len());
                found.push(ExtractedRoot {
                    root,
                    gloss,
                    pattern: pattern.name.clone(),
                });
            }
        }

        found
    }

    /// Finds a short gloss written right after an occurrence of `root` in `text`.
    ///
    /// Recognizes `*root* ("meaning")`, `*root* "meaning"` and
    /// `*root* (meaning)`, matching `root` ASCII case-insensitively. Glosses
    /// of 50 characters or more are ignored.
    #[must_use]
    pub fn extract_gloss(&self, text: &str, root: &str) -> Option<String> {
        if root.is_empty() {
            return None;
        }
        text.char_indices()
            .map(|(start, _)| start)
            .filter(|&start| {
                text.get(start..start + root.len())
                    .is_some_and(|found| found.eq_ignore_ascii_case(root))
            })
            .find_map(|start| self.gloss_after(&text[start + root.len()..]))
    }

    /// Reads a gloss at the start of `rest`, the text following a root.
    fn gloss_after(&self, rest: &str) -> Option<String> {
        self.gloss_tails.iter().find_map(|tail| {
            let gloss = tail.captures(rest)?.get(1)?.as_str().trim();
            (!gloss.is_empty() && gloss.chars().count() < MAX_GLOSS_CHARS)
                .then(|| gloss.to_string())
        })
    }

    /// Extracts root mentions from every etymology text of an entry.
    ///
    /// Returns an empty list when the headword fails hygiene checks or no
    /// pattern matches.
    #[must_use]
    pub fn extract(&self, entry: &DictionaryEntry) -> Vec<RawRootMention> {
        let word = entry.word.trim().to_lowercase();
        if !self.is_valid_word(&word) {
            tracing::trace!(word = %entry.word, "Skipping headword");
            return Vec::new();
        }

        let mut mentions: Vec<RawRootMention> = Vec::new();
        for text in entry.etymology_sources() {
            for extracted in self.extract_roots(text) {
                if let Some(existing) = mentions
                    .iter_mut()
                    .find(|m| m.raw_string == extracted.root)
                {
                    if existing.gloss_candidate.is_none() {
                        existing.gloss_candidate = extracted.gloss;
                    }
                    continue;
                }
                mentions.push(RawRootMention {
                    raw_string: extracted.root,
                    source_word: word.clone(),
                    source_id: entry.source_id().to_string(),
                    gloss_candidate: extracted.gloss,
                });
            }
        }

        if mentions.is_empty() {
            tracing::trace!(word = %word, "No root mentions found");
        }
        mentions
    }
}

/// Normalizes a captured root, or drops it as noise.
fn clean_root(captured: &str) -> Option<String> {
    let kept: String = captured
        .trim_matches('*')
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || is_combining_mark(*c))
        .collect();
    let root = kept.trim_matches('-').to_lowercase();

    if NON_ROOT_CAPTURES.contains(&root.as_str()) {
        return None;
    }
    let len = root.chars().count();
    if !(MIN_ROOT_CHARS..=MAX_ROOT_CHARS).contains(&len) {
        return None;
    }
    if root.chars().all(char::is_numeric) || !root.chars().any(char::is_alphabetic) {
        return None;
    }
    Some(root)
}

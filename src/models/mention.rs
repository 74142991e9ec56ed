//! Dictionary entries and the raw root mentions extracted from them.

use serde::{Deserialize, Serialize};

/// One observation of a root in one etymology text.
///
/// Produced per entry by the extractor and consumed immediately by
/// canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRootMention {
    /// The root as it appeared in the text (markers and diacritics intact).
    pub raw_string: String,
    /// The headword whose etymology mentioned the root.
    pub source_word: String,
    /// Identifier of the independent source document.
    pub source_id: String,
    /// A short gloss found next to the root, if any.
    pub gloss_candidate: Option<String>,
}

impl RawRootMention {
    /// Creates a mention without a gloss.
    #[must_use]
    pub fn new(
        raw_string: impl Into<String>,
        source_word: impl Into<String>,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            raw_string: raw_string.into(),
            source_word: source_word.into(),
            source_id: source_id.into(),
            gloss_candidate: None,
        }
    }

    /// Attaches a gloss candidate.
    #[must_use]
    pub fn with_gloss(mut self, gloss: impl Into<String>) -> Self {
        self.gloss_candidate = Some(gloss.into());
        self
    }
}

/// A dictionary entry as supplied by a bulk dump or a fetched page.
///
/// Field names follow the wiktextract JSONL layout; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// The headword.
    #[serde(alias = "headword")]
    pub word: String,
    /// Explicit source identifier; defaults to the headword.
    #[serde(default)]
    pub source_id: Option<String>,
    /// Main etymology paragraph.
    #[serde(default)]
    pub etymology_text: Option<String>,
    /// Additional etymology paragraphs.
    #[serde(default)]
    pub etymology_texts: Vec<String>,
    /// Senses, some of which carry their own etymology.
    #[serde(default)]
    pub senses: Vec<EntrySense>,
}

/// The part of a sense the extractor reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySense {
    /// Sense-level etymology text.
    #[serde(default)]
    pub etymology: Option<String>,
}

impl DictionaryEntry {
    /// Creates an entry from a headword and its etymology paragraphs.
    #[must_use]
    pub fn new(word: impl Into<String>, etymology_texts: Vec<String>) -> Self {
        Self {
            word: word.into(),
            etymology_texts,
            ..Self::default()
        }
    }

    /// Overrides the source identifier.
    #[must_use]
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Returns the identifier of the source this entry came from.
    #[must_use]
    pub fn source_id(&self) -> &str {
        self.source_id.as_deref().unwrap_or(&self.word)
    }

    /// Iterates every etymology text in the entry, main paragraph first.
    pub fn etymology_sources(&self) -> impl Iterator<Item = &str> {
        self.etymology_text
            .as_deref()
            .into_iter()
            .chain(self.senses.iter().filter_map(|s| s.etymology.as_deref()))
            .chain(self.etymology_texts.iter().map(String::as_str))
    }
}

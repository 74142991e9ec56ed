//! Multi-source consensus over root mentions.
//!
//! Mentions are grouped by canonical id, then by word, collecting the set of
//! independent sources behind each word. A family is admitted only when the
//! union of those sources and the number of distinct words both reach the
//! configured thresholds.

use crate::config::{ConsensusSettings, GlossPolicy};
use crate::models::{CanonicalRootId, Canonicalization, RawRootMention, RootFamily};
use crate::services::RootCanonicalizer;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::instrument;

/// Counters collected while building families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsensusStats {
    /// Mentions observed.
    pub mentions: usize,
    /// Mentions whose root was rejected by canonicalization.
    pub rejected: usize,
    /// Distinct canonical ids seen.
    pub candidate_roots: usize,
    /// Families admitted.
    pub admitted: usize,
    /// Clusters dropped for too few sources.
    pub insufficient_sources: usize,
    /// Clusters dropped for too few words.
    pub insufficient_words: usize,
}

/// Admitted families plus build counters.
#[derive(Debug, Clone, Default)]
pub struct ConsensusResult {
    /// Admitted families keyed by canonical id.
    pub families: BTreeMap<CanonicalRootId, RootFamily>,
    /// Build counters.
    pub stats: ConsensusStats,
}

#[derive(Debug, Default)]
struct Cluster {
    /// word -> sources that attested it under this root
    words: BTreeMap<String, BTreeSet<String>>,
    glosses: Vec<String>,
}

/// Aggregates mentions into corroborated root families.
///
/// Feed mentions with [`observe`](Self::observe) and call
/// [`finish`](Self::finish), or hand a whole batch to
/// [`build`](Self::build).
#[derive(Debug)]
pub struct ConsensusBuilder {
    canonicalizer: RootCanonicalizer,
    settings: ConsensusSettings,
    clusters: BTreeMap<CanonicalRootId, Cluster>,
    mentions: usize,
    rejected: usize,
}

impl ConsensusBuilder {
    /// Creates a builder with explicit thresholds.
    #[must_use]
    pub fn new(canonicalizer: RootCanonicalizer, settings: ConsensusSettings) -> Self {
        Self {
            canonicalizer,
            settings,
            clusters: BTreeMap::new(),
            mentions: 0,
            rejected: 0,
        }
    }

    /// Creates a builder with the default thresholds (2 sources, 2 words,
    /// shortest gloss).
    #[must_use]
    pub fn with_defaults(canonicalizer: RootCanonicalizer) -> Self {
        Self::new(canonicalizer, ConsensusSettings::default())
    }

    /// Records one mention. Rejected roots and blank words are dropped.
    pub fn observe(&mut self, mention: RawRootMention) {
        self.mentions += 1;

        let id = match self.canonicalizer.canonicalize(&mention.raw_string) {
            Canonicalization::Accepted(id) => id,
            Canonicalization::Rejected(_) => {
                self.rejected += 1;
                return;
            },
        };

        let word = mention.source_word.trim().to_lowercase();
        if word.is_empty() {
            return;
        }

        let cluster = self.clusters.entry(id).or_default();
        cluster
            .words
            .entry(word)
            .or_default()
            .insert(mention.source_id);
        if let Some(gloss) = mention
            .gloss_candidate
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
        {
            cluster.glosses.push(gloss);
        }
    }

    /// Records every mention of an iterator.
    pub fn observe_all<I>(&mut self, mentions: I)
    where
        I: IntoIterator<Item = RawRootMention>,
    {
        for mention in mentions {
            self.observe(mention);
        }
    }

    /// Applies the admission test to every cluster.
    #[instrument(skip(self), fields(clusters = self.clusters.len()))]
    pub fn finish(self) -> ConsensusResult {
        let mut stats = ConsensusStats {
            mentions: self.mentions,
            rejected: self.rejected,
            candidate_roots: self.clusters.len(),
            ..ConsensusStats::default()
        };
        let mut families = BTreeMap::new();

        for (id, cluster) in self.clusters {
            let sources: BTreeSet<&str> = cluster
                .words
                .values()
                .flat_map(|s| s.iter().map(String::as_str))
                .collect();

            if sources.len() < self.settings.min_sources {
                tracing::debug!(root = %id, sources = sources.len(), "Insufficient sources");
                stats.insufficient_sources += 1;
                continue;
            }
            if cluster.words.len() < self.settings.min_words {
                tracing::debug!(root = %id, words = cluster.words.len(), "Insufficient words");
                stats.insufficient_words += 1;
                continue;
            }

            let source_count = sources.len();
            let gloss = choose_gloss(&cluster.glosses, self.settings.gloss_policy);
            let family = RootFamily {
                canonical_id: id.clone(),
                words: cluster.words.into_keys().collect(),
                gloss,
                source_count,
            };
            families.insert(id, family);
        }

        stats.admitted = families.len();
        tracing::info!(
            mentions = stats.mentions,
            rejected = stats.rejected,
            candidates = stats.candidate_roots,
            admitted = stats.admitted,
            "Consensus build complete"
        );
        ConsensusResult { families, stats }
    }

    /// Builds families from a batch of mentions.
    #[must_use]
    pub fn build<I>(mut self, mentions: I) -> BTreeMap<CanonicalRootId, RootFamily>
    where
        I: IntoIterator<Item = RawRootMention>,
    {
        self.observe_all(mentions);
        self.finish().families
    }
}

/// Picks one gloss among candidates.
fn choose_gloss(candidates: &[String], policy: GlossPolicy) -> Option<String> {
    let shortest = |a: &&String, b: &&String| {
        a.chars()
            .count()
            .cmp(&b.chars().count())
            .then_with(|| a.cmp(b))
    };

    match policy {
        GlossPolicy::Shortest => candidates.iter().min_by(shortest).cloned(),
        GlossPolicy::MostAttested => {
            let mut counts: HashMap<&String, usize> = HashMap::new();
            for gloss in candidates {
                *counts.entry(gloss).or_insert(0) += 1;
            }
            let top = counts.values().copied().max()?;
            counts
                .into_iter()
                .filter(|(_, count)| *count == top)
                .map(|(gloss, _)| gloss)
                .min_by(|a, b| shortest(a, b))
                .cloned()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(root: &str, word: &str, source: &str) -> RawRootMention {
        RawRootMention::new(root, word, source)
    }

    fn builder() -> ConsensusBuilder {
        ConsensusBuilder::with_defaults(RootCanonicalizer::default())
    }

    #[test]
    fn test_two_sources_admitted() {
        let families = builder().build(vec![
            mention("habjan", "have", "A"),
            mention("hebban", "hover", "B"),
        ]);
        let family = &families[&CanonicalRootId::new("HABJAN")];
        assert_eq!(family.source_count, 2);
        assert!(family.words.contains("have"));
        assert!(family.words.contains("hover"));
    }

    #[test]
    fn test_single_source_rejected() {
        let result = {
            let mut b = builder();
            b.observe_all(vec![
                mention("habjan", "have", "A"),
                mention("habjan", "hover", "A"),
            ]);
            b.finish()
        };
        assert!(result.families.is_empty());
        assert_eq!(result.stats.insufficient_sources, 1);
    }

    #[test]
    fn test_single_word_rejected() {
        let mut b = builder();
        b.observe_all(vec![
            mention("*sal-", "salary", "A"),
            mention("*sal-", "Salary", "B"),
        ]);
        let result = b.finish();
        assert!(result.families.is_empty());
        assert_eq!(result.stats.insufficient_words, 1);
    }

    #[test]
    fn test_rejected_roots_counted() {
        let mut b = builder();
        b.observe_all(vec![mention("car", "cart", "A"), mention("the", "then", "B")]);
        let result = b.finish();
        assert_eq!(result.stats.mentions, 2);
        assert_eq!(result.stats.rejected, 2);
        assert_eq!(result.stats.candidate_roots, 0);
    }

    #[test]
    fn test_shortest_gloss_wins() {
        let families = builder().build(vec![
            mention("*sal-", "salary", "A").with_gloss("salt, brine"),
            mention("*sal-", "salad", "B").with_gloss("salt"),
            mention("*sal-", "saline", "C").with_gloss("sale"),
        ]);
        let family = &families[&CanonicalRootId::new("SAL")];
        assert_eq!(family.gloss.as_deref(), Some("sale"));
        assert_eq!(family.source_count, 3);
    }

    #[test]
    fn test_most_attested_gloss() {
        let settings = ConsensusSettings {
            gloss_policy: GlossPolicy::MostAttested,
            ..ConsensusSettings::default()
        };
        let families = ConsensusBuilder::new(RootCanonicalizer::default(), settings).build(vec![
            mention("*sal-", "salary", "A").with_gloss("salt"),
            mention("*sal-", "salad", "B").with_gloss("to salt"),
            mention("*sal-", "saline", "C").with_gloss("to salt"),
        ]);
        assert_eq!(
            families[&CanonicalRootId::new("SAL")].gloss.as_deref(),
            Some("to salt")
        );
    }

    #[test]
    fn test_custom_thresholds() {
        let settings = ConsensusSettings {
            min_sources: 3,
            ..ConsensusSettings::default()
        };
        let families = ConsensusBuilder::new(RootCanonicalizer::default(), settings).build(vec![
            mention("*sal-", "salary", "A"),
            mention("*sal-", "salad", "B"),
        ]);
        assert!(families.is_empty());
    }

    #[test]
    fn test_choose_gloss_ties() {
        let glosses = vec!["bb".to_string(), "aa".to_string()];
        assert_eq!(
            choose_gloss(&glosses, GlossPolicy::Shortest).as_deref(),
            Some("aa")
        );
        assert!(choose_gloss(&[], GlossPolicy::MostAttested).is_none());
    }
}

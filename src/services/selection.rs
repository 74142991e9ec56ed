//! Fresh pair selection.
//!
//! Each call enumerates every unordered word pair of every family, drops
//! pairs that were already posted, pairs with a problematic word and (unless
//! asked for) affix-trivial pairs, then lets a [`RankingStrategy`] pick one.
//! Nothing is kept between calls; the store is the only memory.

use crate::models::{CandidatePair, RootFamily};
use crate::services::TrivialityFilter;
use crate::storage::EtymologyStore;
use crate::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// External semantic distance between two words.
///
/// Scores are expected in `0.0..=1.0`; anything else, or `None`, means
/// "no score".
pub trait DivergenceScorer: Send {
    /// Scores a pair.
    fn score(&self, word1: &str, word2: &str) -> Option<f64>;
}

impl<F> DivergenceScorer for F
where
    F: Fn(&str, &str) -> Option<f64> + Send,
{
    fn score(&self, word1: &str, word2: &str) -> Option<f64> {
        self(word1, word2)
    }
}

/// Picks one pair among the surviving candidates.
pub trait RankingStrategy: Send {
    /// Strategy name for logs.
    fn name(&self) -> &'static str;

    /// Picks one candidate; `candidates` is never empty.
    fn pick(&mut self, candidates: Vec<CandidatePair>) -> Option<CandidatePair>;
}

/// Uniform random choice, with no bias toward any family or ordering.
#[derive(Debug, Clone)]
pub struct UniformRandom {
    rng: StdRng,
}

impl UniformRandom {
    /// Seeds from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible choices from a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for UniformRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RankingStrategy for UniformRandom {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn pick(&mut self, candidates: Vec<CandidatePair>) -> Option<CandidatePair> {
        candidates.choose(&mut self.rng).cloned()
    }
}

/// Takes the highest-scoring candidate.
///
/// Ties go to the first candidate in enumeration order. When no candidate
/// has a usable score the choice falls back to uniform random.
pub struct MaxDivergence<S> {
    scorer: S,
    fallback: UniformRandom,
}

impl<S: DivergenceScorer> MaxDivergence<S> {
    /// Creates the strategy around a scorer.
    #[must_use]
    pub fn new(scorer: S) -> Self {
        Self {
            scorer,
            fallback: UniformRandom::new(),
        }
    }

    /// Uses a seeded fallback for reproducible runs.
    #[must_use]
    pub fn with_fallback(mut self, fallback: UniformRandom) -> Self {
        self.fallback = fallback;
        self
    }
}

impl<S: DivergenceScorer> RankingStrategy for MaxDivergence<S> {
    fn name(&self) -> &'static str {
        "max_divergence"
    }

    fn pick(&mut self, candidates: Vec<CandidatePair>) -> Option<CandidatePair> {
        let mut best: Option<(usize, f64)> = None;
        for (i, pair) in candidates.iter().enumerate() {
            let Some(score) = self
                .scorer
                .score(&pair.word1, &pair.word2)
                .filter(|s| (0.0..=1.0).contains(s))
            else {
                continue;
            };
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((i, score));
            }
        }

        match best {
            Some((i, score)) => {
                tracing::debug!(score, "Picked highest divergence");
                candidates.into_iter().nth(i)
            },
            None => {
                tracing::debug!("No divergence scores, falling back to uniform");
                self.fallback.pick(candidates)
            },
        }
    }
}

#[derive(Debug, Default)]
struct FilterCounts {
    enumerated: usize,
    posted: usize,
    problematic: usize,
    trivial: usize,
}

/// Produces one fresh, qualifying pair per call.
pub struct PairSelectionEngine {
    strategy: Box<dyn RankingStrategy>,
    filter: TrivialityFilter,
}

impl std::fmt::Debug for PairSelectionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairSelectionEngine")
            .field("strategy", &self.strategy.name())
            .finish_non_exhaustive()
    }
}

impl Default for PairSelectionEngine {
    fn default() -> Self {
        Self::uniform()
    }
}

impl PairSelectionEngine {
    /// Uniform random selection.
    #[must_use]
    pub fn uniform() -> Self {
        Self::with_strategy(UniformRandom::new())
    }

    /// Uniform random selection from a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_strategy(UniformRandom::seeded(seed))
    }

    /// Selection with a custom ranking strategy.
    #[must_use]
    pub fn with_strategy(strategy: impl RankingStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
            filter: TrivialityFilter::new(),
        }
    }

    /// Every pair that survives filtering, in family then word order.
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub fn candidates<'a, I, S>(
        &self,
        families: I,
        store: &S,
        include_trivial: bool,
    ) -> Result<Vec<CandidatePair>>
    where
        I: IntoIterator<Item = &'a RootFamily>,
        S: EtymologyStore + ?Sized,
    {
        self.collect(families, store, include_trivial)
            .map(|(candidates, _)| candidates)
    }

    /// Selects one fresh pair, or `None` when every pair is used up.
    ///
    /// `None` means nothing to post this cycle; it is not an error.
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub fn select_fresh_pair<'a, I, S>(
        &mut self,
        families: I,
        store: &S,
        include_trivial: bool,
    ) -> Result<Option<CandidatePair>>
    where
        I: IntoIterator<Item = &'a RootFamily>,
        S: EtymologyStore + ?Sized,
    {
        let (candidates, counts) = self.collect(families, store, include_trivial)?;
        tracing::debug!(
            enumerated = counts.enumerated,
            posted = counts.posted,
            problematic = counts.problematic,
            trivial = counts.trivial,
            remaining = candidates.len(),
            "Filtered candidate pairs"
        );

        if candidates.is_empty() {
            tracing::info!("No fresh pairs left");
            metrics::counter!("pair_selection_total", "outcome" => "exhausted").increment(1);
            return Ok(None);
        }

        let picked = self.strategy.pick(candidates);
        if let Some(pair) = &picked {
            tracing::info!(
                pair = %pair,
                strategy = self.strategy.name(),
                "Selected pair"
            );
        }
        metrics::counter!("pair_selection_total", "outcome" => "selected").increment(1);
        Ok(picked)
    }

    fn collect<'a, I, S>(
        &self,
        families: I,
        store: &S,
        include_trivial: bool,
    ) -> Result<(Vec<CandidatePair>, FilterCounts)>
    where
        I: IntoIterator<Item = &'a RootFamily>,
        S: EtymologyStore + ?Sized,
    {
        let mut counts = FilterCounts::default();
        let mut candidates = Vec::new();
        // problematic status per word, valid for this call only
        let mut problematic: HashMap<&str, bool> = HashMap::new();

        for family in families {
            if family.words.len() < 2 {
                continue;
            }
            let root = &family.canonical_id;

            for (w1, w2) in family.pairs() {
                counts.enumerated += 1;

                if !include_trivial && self.filter.is_trivial(root.as_str(), w1, w2) {
                    counts.trivial += 1;
                    continue;
                }
                if is_problematic(store, &mut problematic, w1)?
                    || is_problematic(store, &mut problematic, w2)?
                {
                    counts.problematic += 1;
                    continue;
                }
                if store.is_pair_posted(w1, w2)? {
                    counts.posted += 1;
                    continue;
                }

                match CandidatePair::new(root.clone(), w1, w2, family.gloss.clone()) {
                    Ok(pair) => candidates.push(pair),
                    Err(e) => tracing::debug!(root = %root, w1, w2, error = %e, "Skipping pair"),
                }
            }
        }

        Ok((candidates, counts))
    }
}

fn is_problematic<'w, S>(
    store: &S,
    cache: &mut HashMap<&'w str, bool>,
    word: &'w str,
) -> Result<bool>
where
    S: EtymologyStore + ?Sized,
{
    if let Some(&known) = cache.get(word) {
        return Ok(known);
    }
    let flagged = store.is_word_problematic(word)?;
    cache.insert(word, flagged);
    Ok(flagged)
}

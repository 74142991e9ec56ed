//! Etymology store trait.

use crate::models::{
    CandidatePair, CanonicalRootId, PostedPairRecord, RootFamily, WordFailureRecord,
};
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Row counts reported by [`EtymologyStore::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// `(root, word)` mappings.
    pub mappings: usize,
    /// Distinct roots with at least one mapping.
    pub roots: usize,
    /// Roots with two or more words.
    pub multi_word_roots: usize,
    /// Posted pairs.
    pub posted: usize,
    /// Words with at least one recorded failure.
    pub failed_words: usize,
    /// Words at or above the failure threshold.
    pub problematic_words: usize,
    /// Pairs posted in the last 24 hours.
    pub posted_last_24h: usize,
}

/// Durable storage for root mappings, posted pairs and word failures.
///
/// Every mutating method runs in a single transaction that is rolled back on
/// any error; a failed write surfaces as [`Error::TransactionFailed`] and
/// must not be assumed to have happened. Reads run outside transactions.
///
/// Pair identity is order-independent: `(a, b)` and `(b, a)` are the same
/// pair for every method here.
pub trait EtymologyStore: Send + Sync {
    /// Adds one `(root, word)` mapping.
    ///
    /// Returns `true` if newly inserted, `false` if it already existed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a blank word, or
    /// [`Error::TransactionFailed`] if the insert cannot commit.
    fn add_root_mapping(&self, root: &CanonicalRootId, word: &str) -> Result<bool>;

    /// Adds many mappings in one transaction. Returns the number newly inserted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransactionFailed`] if the batch cannot commit; no
    /// mapping of the batch is stored in that case.
    fn add_root_mappings(&self, mappings: &[(CanonicalRootId, String)]) -> Result<usize>;

    /// Words mapped to `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the query fails.
    fn get_words_for_root(&self, root: &CanonicalRootId) -> Result<BTreeSet<String>>;

    /// Returns true if the pair was posted, in either orientation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the query fails.
    fn is_pair_posted(&self, word1: &str, word2: &str) -> Result<bool>;

    /// Records a successful external post at `posted_at`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecordedPost`] if the record cannot be written,
    /// including when the pair is already recorded.
    fn try_record_posted_pair_at(
        &self,
        pair: &CandidatePair,
        external_id: &str,
        posted_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Records a successful external post now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecordedPost`] if the record cannot be written.
    fn try_record_posted_pair(&self, pair: &CandidatePair, external_id: &str) -> Result<()> {
        self.try_record_posted_pair_at(pair, external_id, Utc::now())
    }

    /// Records a successful external post, returning `false` on failure.
    ///
    /// A failure here means the post exists externally but not in the store.
    /// It is logged at `error` level as a reconciliation risk; the pair stays
    /// selectable, so retrying the post may duplicate it.
    fn record_posted_pair(&self, pair: &CandidatePair, external_id: &str) -> bool {
        match self.try_record_posted_pair(pair, external_id) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    word1 = %pair.word1,
                    word2 = %pair.word2,
                    root = %pair.root,
                    external_id,
                    error = %e,
                    "Posted pair was not recorded; reconcile manually"
                );
                metrics::counter!("unrecorded_posts_total").increment(1);
                false
            },
        }
    }

    /// Posted pairs, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the query fails.
    fn posted_pairs(&self) -> Result<Vec<PostedPairRecord>>;

    /// Increments the failure counter of `word`, inserting it at 1 if absent.
    ///
    /// Returns the new count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a blank word, or
    /// [`Error::TransactionFailed`] if the upsert cannot commit.
    fn record_word_failure_at(&self, word: &str, at: DateTime<Utc>) -> Result<u32>;

    /// Increments the failure counter of `word` now.
    ///
    /// # Errors
    ///
    /// See [`record_word_failure_at`](Self::record_word_failure_at).
    fn record_word_failure(&self, word: &str) -> Result<u32> {
        self.record_word_failure_at(word, Utc::now())
    }

    /// Failure record of `word`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the query fails.
    fn word_failure(&self, word: &str) -> Result<Option<WordFailureRecord>>;

    /// Failure count at which a word becomes problematic.
    fn max_word_failures(&self) -> u32;

    /// Returns true once `word` has failed `max_word_failures` times.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the query fails.
    fn is_word_problematic(&self, word: &str) -> Result<bool> {
        let threshold = self.max_word_failures();
        Ok(self
            .word_failure(word)?
            .is_some_and(|record| record.failure_count >= threshold))
    }

    /// Deletes failure records whose last failure is before `cutoff`.
    ///
    /// Returns the number deleted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransactionFailed`] if the delete cannot commit.
    fn cleanup_failures_before(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    /// Deletes failure records older than `age`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a negative age, or
    /// [`Error::TransactionFailed`] if the delete cannot commit.
    fn cleanup_old_failures(&self, age: Duration) -> Result<usize> {
        if age < Duration::zero() {
            return Err(Error::InvalidInput(format!(
                "cleanup age must not be negative, got {age}"
            )));
        }
        self.cleanup_failures_before(Utc::now() - age)
    }

    /// Number of pairs posted between `start` and `end`, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the query fails.
    fn get_posts_in_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<usize>;

    /// Row counts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if a query fails.
    fn stats(&self) -> Result<StoreStats>;

    /// Roots with two or more words, largest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the query fails.
    fn roots_with_multiple_words(&self, limit: Option<usize>)
    -> Result<Vec<(CanonicalRootId, usize)>>;

    /// Stores consensus families: their mappings plus gloss and source count.
    ///
    /// Families with fewer than two words, or attested by fewer than the
    /// store's `min_sources` distinct sources, are skipped. Returns the
    /// number of newly inserted mappings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransactionFailed`] if the import cannot commit; no
    /// family is stored in that case.
    fn import_families(&self, families: &[RootFamily]) -> Result<usize>;

    /// Rebuilds every stored family with two or more words.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the query fails.
    fn load_families(&self) -> Result<BTreeMap<CanonicalRootId, RootFamily>>;
}

//! `SQLite` backend for the etymology store.
//!
//! # Schema
//!
//! | Table | Key | Contents |
//! |-------|-----|----------|
//! | `root_map` | `UNIQUE(root, word)` | one row per word of a root family |
//! | `root_meta` | `root` | gloss and source count of imported families |
//! | `posted` | `UNIQUE(word1, word2)` | posted pairs, words in sorted order |
//! | `failed_words` | `word` | failure counter and last failure time |
//!
//! Timestamps are Unix seconds.

use super::traits::{EtymologyStore, StoreStats};
use crate::config::EtymoConfig;
use crate::models::{
    CandidatePair, CanonicalRootId, PairKey, PostedPairRecord, RootFamily, WordFailureRecord,
    normalize_word,
};
use crate::storage::sqlite::{open_connection, open_in_memory, with_read, with_transaction};
use crate::{Error, Result, current_timestamp};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::instrument;

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS root_map (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        root TEXT NOT NULL,
        word TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        UNIQUE(root, word)
    );
    CREATE INDEX IF NOT EXISTS idx_root_map_word ON root_map(word);

    CREATE TABLE IF NOT EXISTS root_meta (
        root TEXT PRIMARY KEY,
        gloss TEXT,
        source_count INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS posted (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        word1 TEXT NOT NULL,
        word2 TEXT NOT NULL,
        root TEXT NOT NULL,
        external_id TEXT NOT NULL,
        posted_at INTEGER NOT NULL,
        UNIQUE(word1, word2)
    );
    CREATE INDEX IF NOT EXISTS idx_posted_at ON posted(posted_at);

    CREATE TABLE IF NOT EXISTS failed_words (
        word TEXT PRIMARY KEY,
        failure_count INTEGER NOT NULL CHECK (failure_count > 0),
        last_failure INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_failed_words_last ON failed_words(last_failure);
";

/// Store settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSettings {
    /// Failure count at which a word is excluded from selection.
    pub max_word_failures: u32,
    /// Distinct sources a family needs before it is persisted.
    pub min_sources: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_word_failures: 3,
            min_sources: 2,
        }
    }
}

impl StoreSettings {
    /// Takes the store settings from the application config.
    #[must_use]
    pub const fn from_config(config: &EtymoConfig) -> Self {
        Self {
            max_word_failures: config.max_word_failures,
            min_sources: config.consensus.min_sources,
        }
    }
}

/// SQLite-based etymology store.
///
/// One connection behind a mutex; every write is a single `IMMEDIATE`
/// transaction.
pub struct SqliteEtymologyStore {
    conn: Mutex<Connection>,
    settings: StoreSettings,
    db_path: Option<PathBuf>,
}

impl SqliteEtymologyStore {
    /// Opens (or creates) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the database cannot be opened,
    /// or [`Error::TransactionFailed`] if the schema cannot be created.
    pub fn open(path: impl AsRef<Path>, settings: StoreSettings) -> Result<Self> {
        let path = path.as_ref();
        let store = Self {
            conn: Mutex::new(open_connection(path)?),
            settings,
            db_path: Some(path.to_path_buf()),
        };
        store.initialize_schema()?;
        tracing::debug!(path = %path.display(), "Opened etymology store");
        Ok(store)
    }

    /// Creates an in-memory store (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory(settings: StoreSettings) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(open_in_memory()?),
            settings,
            db_path: None,
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Database file path, `None` for in-memory stores.
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn initialize_schema(&self) -> Result<()> {
        with_transaction(&self.conn, "initialize_schema", |tx| tx.execute_batch(SCHEMA))
    }
}

fn require_word(word: &str) -> Result<String> {
    let word = normalize_word(word);
    if word.is_empty() {
        return Err(Error::InvalidInput("word must be non-empty".to_string()));
    }
    Ok(word)
}

fn from_db_timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn to_count(n: i64) -> usize {
    usize::try_from(n).unwrap_or(0)
}

fn count(conn: &Connection, sql: &str) -> rusqlite::Result<usize> {
    conn.query_row(sql, [], |row| row.get::<_, i64>(0))
        .map(to_count)
}

impl EtymologyStore for SqliteEtymologyStore {
    #[instrument(skip(self, root), fields(root = %root))]
    fn add_root_mapping(&self, root: &CanonicalRootId, word: &str) -> Result<bool> {
        let word = require_word(word)?;
        let now = current_timestamp();
        let inserted = with_transaction(&self.conn, "add_root_mapping", |tx| {
            tx.execute(
                "INSERT OR IGNORE INTO root_map (root, word, created_at) VALUES (?1, ?2, ?3)",
                params![root.as_str(), word, now],
            )
        })?;
        Ok(inserted > 0)
    }

    #[instrument(skip(self, mappings), fields(count = mappings.len()))]
    fn add_root_mappings(&self, mappings: &[(CanonicalRootId, String)]) -> Result<usize> {
        let rows = mappings
            .iter()
            .map(|(root, word)| require_word(word).map(|w| (root.as_str(), w)))
            .collect::<Result<Vec<_>>>()?;
        let now = current_timestamp();

        with_transaction(&self.conn, "add_root_mappings", |tx| {
            let mut stmt = tx.prepare_cached(
                "INSERT OR IGNORE INTO root_map (root, word, created_at) VALUES (?1, ?2, ?3)",
            )?;
            let mut inserted = 0;
            for (root, word) in &rows {
                inserted += stmt.execute(params![root, word, now])?;
            }
            Ok(inserted)
        })
    }

    fn get_words_for_root(&self, root: &CanonicalRootId) -> Result<BTreeSet<String>> {
        with_read(&self.conn, "get_words_for_root", |conn| {
            let mut stmt = conn.prepare_cached("SELECT word FROM root_map WHERE root = ?1")?;
            let words = stmt
                .query_map(params![root.as_str()], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<BTreeSet<_>>>()?;
            Ok(words)
        })
    }

    fn is_pair_posted(&self, word1: &str, word2: &str) -> Result<bool> {
        let key = PairKey::new(word1, word2);
        with_read(&self.conn, "is_pair_posted", |conn| {
            conn.query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM posted
                    WHERE (word1 = ?1 AND word2 = ?2) OR (word1 = ?2 AND word2 = ?1)
                )",
                params![key.first(), key.second()],
                |row| row.get::<_, bool>(0),
            )
        })
    }

    #[instrument(skip(self, pair), fields(pair = %pair.key()))]
    fn try_record_posted_pair_at(
        &self,
        pair: &CandidatePair,
        external_id: &str,
        posted_at: DateTime<Utc>,
    ) -> Result<()> {
        let key = pair.key();
        with_transaction(&self.conn, "record_posted_pair", |tx| {
            tx.execute(
                "INSERT INTO posted (word1, word2, root, external_id, posted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    key.first(),
                    key.second(),
                    pair.root.as_str(),
                    external_id,
                    posted_at.timestamp()
                ],
            )
        })
        .map(|_| {
            tracing::info!("Recorded posted pair");
        })
        .map_err(|e| Error::UnrecordedPost {
            word1: pair.word1.clone(),
            word2: pair.word2.clone(),
            external_id: external_id.to_string(),
            cause: e.to_string(),
        })
    }

    fn posted_pairs(&self) -> Result<Vec<PostedPairRecord>> {
        with_read(&self.conn, "posted_pairs", |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT word1, word2, root, external_id, posted_at
                 FROM posted ORDER BY posted_at, id",
            )?;
            let records = stmt
                .query_map([], |row| {
                    Ok(PostedPairRecord {
                        word1: row.get(0)?,
                        word2: row.get(1)?,
                        root: row.get(2)?,
                        external_post_id: row.get(3)?,
                        posted_at: from_db_timestamp(row.get(4)?),
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
    }

    #[instrument(skip(self))]
    fn record_word_failure_at(&self, word: &str, at: DateTime<Utc>) -> Result<u32> {
        let word = require_word(word)?;
        let count = with_transaction(&self.conn, "record_word_failure", |tx| {
            tx.query_row(
                "INSERT INTO failed_words (word, failure_count, last_failure) VALUES (?1, 1, ?2)
                 ON CONFLICT(word) DO UPDATE SET
                     failure_count = failure_count + 1,
                     last_failure = excluded.last_failure
                 RETURNING failure_count",
                params![word, at.timestamp()],
                |row| row.get::<_, u32>(0),
            )
        })?;

        if count >= self.settings.max_word_failures {
            tracing::warn!(word = %word, failures = count, "Word is now problematic");
        }
        Ok(count)
    }

    fn word_failure(&self, word: &str) -> Result<Option<WordFailureRecord>> {
        let word = normalize_word(word);
        with_read(&self.conn, "word_failure", |conn| {
            conn.query_row(
                "SELECT word, failure_count, last_failure FROM failed_words WHERE word = ?1",
                params![word],
                |row| {
                    Ok(WordFailureRecord {
                        word: row.get(0)?,
                        failure_count: row.get(1)?,
                        last_failure: from_db_timestamp(row.get(2)?),
                    })
                },
            )
            .optional()
        })
    }

    fn max_word_failures(&self) -> u32 {
        self.settings.max_word_failures
    }

    #[instrument(skip(self))]
    fn cleanup_failures_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let deleted = with_transaction(&self.conn, "cleanup_failures", |tx| {
            tx.execute(
                "DELETE FROM failed_words WHERE last_failure < ?1",
                params![cutoff.timestamp()],
            )
        })?;
        if deleted > 0 {
            tracing::info!(deleted, "Cleaned up old word failures");
        }
        Ok(deleted)
    }

    fn get_posts_in_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<usize> {
        with_read(&self.conn, "get_posts_in_window", |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM posted WHERE posted_at BETWEEN ?1 AND ?2",
                params![start.timestamp(), end.timestamp()],
                |row| row.get::<_, i64>(0),
            )
            .map(to_count)
        })
    }

    fn stats(&self) -> Result<StoreStats> {
        let threshold = self.settings.max_word_failures;
        let day_ago = (Utc::now() - Duration::hours(24)).timestamp();
        with_read(&self.conn, "stats", |conn| {
            Ok(StoreStats {
                mappings: count(conn, "SELECT COUNT(*) FROM root_map")?,
                roots: count(conn, "SELECT COUNT(DISTINCT root) FROM root_map")?,
                multi_word_roots: count(
                    conn,
                    "SELECT COUNT(*) FROM
                        (SELECT root FROM root_map GROUP BY root HAVING COUNT(*) >= 2)",
                )?,
                posted: count(conn, "SELECT COUNT(*) FROM posted")?,
                failed_words: count(conn, "SELECT COUNT(*) FROM failed_words")?,
                problematic_words: conn
                    .query_row(
                        "SELECT COUNT(*) FROM failed_words WHERE failure_count >= ?1",
                        params![threshold],
                        |row| row.get::<_, i64>(0),
                    )
                    .map(to_count)?,
                posted_last_24h: conn
                    .query_row(
                        "SELECT COUNT(*) FROM posted WHERE posted_at >= ?1",
                        params![day_ago],
                        |row| row.get::<_, i64>(0),
                    )
                    .map(to_count)?,
            })
        })
    }

    fn roots_with_multiple_words(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<(CanonicalRootId, usize)>> {
        // LIMIT -1 means no limit in SQLite
        let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
        with_read(&self.conn, "roots_with_multiple_words", |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT root, COUNT(*) AS n FROM root_map
                 GROUP BY root HAVING n >= 2
                 ORDER BY n DESC, root ASC
                 LIMIT ?1",
            )?;
            let roots = stmt
                .query_map(params![limit], |row| {
                    Ok((
                        CanonicalRootId::new(row.get::<_, String>(0)?),
                        to_count(row.get(1)?),
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(roots)
        })
    }

    #[instrument(skip(self, families), fields(families = families.len()))]
    fn import_families(&self, families: &[RootFamily]) -> Result<usize> {
        let now = current_timestamp();
        let inserted = with_transaction(&self.conn, "import_families", |tx| {
            let mut meta = tx.prepare_cached(
                "INSERT INTO root_meta (root, gloss, source_count) VALUES (?1, ?2, ?3)
                 ON CONFLICT(root) DO UPDATE SET
                     gloss = COALESCE(excluded.gloss, root_meta.gloss),
                     source_count = MAX(root_meta.source_count, excluded.source_count)",
            )?;
            let mut mapping = tx.prepare_cached(
                "INSERT OR IGNORE INTO root_map (root, word, created_at) VALUES (?1, ?2, ?3)",
            )?;

            let mut inserted = 0;
            for family in families {
                if family.words.len() < 2 || family.source_count < self.settings.min_sources {
                    tracing::debug!(
                        root = %family.canonical_id,
                        words = family.words.len(),
                        sources = family.source_count,
                        "Skipping uncorroborated family"
                    );
                    continue;
                }
                let root = family.canonical_id.as_str();
                let sources = i64::try_from(family.source_count).unwrap_or(i64::MAX);
                meta.execute(params![root, family.gloss, sources])?;
                for word in &family.words {
                    let word = normalize_word(word);
                    if !word.is_empty() {
                        inserted += mapping.execute(params![root, word, now])?;
                    }
                }
            }
            Ok(inserted)
        })?;

        tracing::info!(inserted, "Imported root families");
        Ok(inserted)
    }

    fn load_families(&self) -> Result<BTreeMap<CanonicalRootId, RootFamily>> {
        let rows = with_read(&self.conn, "load_families", |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT m.root, m.word, meta.gloss, meta.source_count
                 FROM root_map m
                 LEFT JOIN root_meta meta ON meta.root = m.root
                 ORDER BY m.root, m.word",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })?;

        let mut families: BTreeMap<CanonicalRootId, RootFamily> = BTreeMap::new();
        for (root, word, gloss, sources) in rows {
            let id = CanonicalRootId::new(root);
            families
                .entry(id.clone())
                .or_insert_with(|| RootFamily {
                    canonical_id: id,
                    words: BTreeSet::new(),
                    gloss,
                    source_count: sources.map_or(1, to_count),
                })
                .words
                .insert(word);
        }
        families.retain(|_, family| family.words.len() >= 2);
        Ok(families)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store() -> SqliteEtymologyStore {
        SqliteEtymologyStore::in_memory(StoreSettings::default()).unwrap()
    }

    fn root(id: &str) -> CanonicalRootId {
        CanonicalRootId::new(id)
    }

    fn pair(w1: &str, w2: &str) -> CandidatePair {
        CandidatePair::new(root("SAL"), w1, w2, Some("salt".to_string())).unwrap()
    }

    #[test]
    fn test_add_root_mapping_is_idempotent() {
        let store = store();
        assert!(store.add_root_mapping(&root("SAL"), "salary").unwrap());
        assert!(!store.add_root_mapping(&root("SAL"), "Salary ").unwrap());
        assert!(store.add_root_mapping(&root("SAL"), "salad").unwrap());

        let words = store.get_words_for_root(&root("SAL")).unwrap();
        assert_eq!(words.len(), 2);
        assert!(words.contains("salary"));
        assert!(store.get_words_for_root(&root("NONE")).unwrap().is_empty());
    }

    #[test]
    fn test_blank_word_rejected() {
        let store = store();
        assert!(matches!(
            store.add_root_mapping(&root("SAL"), "  "),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            store.record_word_failure(""),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_batch_mappings() {
        let store = store();
        let mappings = vec![
            (root("SAL"), "salary".to_string()),
            (root("SAL"), "salad".to_string()),
            (root("SAL"), "salad".to_string()),
            (root("HABJAN"), "have".to_string()),
        ];
        assert_eq!(store.add_root_mappings(&mappings).unwrap(), 3);
        assert_eq!(store.add_root_mappings(&mappings).unwrap(), 0);
    }

    #[test]
    fn test_batch_with_blank_word_stores_nothing() {
        let store = store();
        let mappings = vec![(root("SAL"), "salary".to_string()), (root("SAL"), String::new())];
        assert!(store.add_root_mappings(&mappings).is_err());
        assert_eq!(store.stats().unwrap().mappings, 0);
    }

    #[test]
    fn test_posted_pair_both_orientations() {
        let store = store();
        assert!(!store.is_pair_posted("salary", "salad").unwrap());
        assert!(store.record_posted_pair(&pair("salary", "salad"), "post-1"));
        assert!(store.is_pair_posted("salary", "salad").unwrap());
        assert!(store.is_pair_posted("salad", "salary").unwrap());
        assert!(store.is_pair_posted("SALAD", " salary").unwrap());
    }

    #[test]
    fn test_duplicate_post_is_unrecorded() {
        let store = store();
        assert!(store.record_posted_pair(&pair("salary", "salad"), "post-1"));
        assert!(!store.record_posted_pair(&pair("salad", "salary"), "post-2"));

        let err = store
            .try_record_posted_pair(&pair("salad", "salary"), "post-3")
            .unwrap_err();
        assert!(matches!(err, Error::UnrecordedPost { ref external_id, .. } if external_id == "post-3"));
        assert_eq!(store.posted_pairs().unwrap().len(), 1);
    }

    #[test]
    fn test_posted_pairs_listing() {
        let store = store();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        store
            .try_record_posted_pair_at(&pair("salary", "salad"), "post-1", at)
            .unwrap();

        let records = store.posted_pairs().unwrap();
        assert_eq!(records[0].word1, "salad");
        assert_eq!(records[0].word2, "salary");
        assert_eq!(records[0].root, "SAL");
        assert_eq!(records[0].external_post_id, "post-1");
        assert_eq!(records[0].posted_at, at);
    }

    #[test]
    fn test_failure_threshold() {
        let store = store();
        assert_eq!(store.record_word_failure("gift").unwrap(), 1);
        assert_eq!(store.record_word_failure("Gift").unwrap(), 2);
        assert!(!store.is_word_problematic("gift").unwrap());
        assert_eq!(store.record_word_failure("gift").unwrap(), 3);
        assert!(store.is_word_problematic("gift").unwrap());
        assert!(!store.is_word_problematic("poison").unwrap());
    }

    #[test]
    fn test_cleanup_failures() {
        let store = store();
        let old = Utc::now() - Duration::days(10);
        store.record_word_failure_at("gift", old).unwrap();
        store.record_word_failure("poison").unwrap();

        assert_eq!(store.cleanup_old_failures(Duration::days(7)).unwrap(), 1);
        assert!(store.word_failure("gift").unwrap().is_none());
        assert_eq!(store.word_failure("poison").unwrap().unwrap().failure_count, 1);
        assert!(store.cleanup_old_failures(Duration::days(-1)).is_err());
    }

    #[test]
    fn test_posts_in_window() {
        let store = store();
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for (i, (w1, w2)) in [("salary", "salad"), ("salary", "saline"), ("salad", "saline")]
            .iter()
            .enumerate()
        {
            let at = base + Duration::hours(i64::try_from(i).unwrap() * 12);
            store.try_record_posted_pair_at(&pair(w1, w2), "id", at).unwrap();
        }

        assert_eq!(store.get_posts_in_window(base, base + Duration::hours(12)).unwrap(), 2);
        assert_eq!(store.get_posts_in_window(base, base + Duration::days(2)).unwrap(), 3);
        assert_eq!(store.get_posts_in_window(base + Duration::days(2), base).unwrap(), 0);
    }

    #[test]
    fn test_import_and_load_families() {
        let store = store();
        let families = vec![
            RootFamily::new(root("SAL"), ["salary", "salad"])
                .with_gloss("salt")
                .with_source_count(2),
            RootFamily::new(root("LONE"), ["alone"]).with_source_count(4),
        ];
        assert_eq!(store.import_families(&families).unwrap(), 2);

        let loaded = store.load_families().unwrap();
        assert_eq!(loaded.len(), 1);
        let sal = &loaded[&root("SAL")];
        assert_eq!(sal.gloss.as_deref(), Some("salt"));
        assert_eq!(sal.source_count, 2);
        assert_eq!(sal.words.len(), 2);
    }

    #[test]
    fn test_import_skips_uncorroborated_families() {
        let families = vec![
            RootFamily::new(root("HABJAN"), ["have", "hover"]).with_source_count(1),
            RootFamily::new(root("SAL"), ["salary", "salad"]).with_source_count(2),
        ];

        let store = store();
        assert_eq!(store.import_families(&families).unwrap(), 2);
        let loaded = store.load_families().unwrap();
        assert!(!loaded.contains_key(&root("HABJAN")));
        assert!(loaded.contains_key(&root("SAL")));

        let lenient = SqliteEtymologyStore::in_memory(StoreSettings {
            min_sources: 1,
            ..StoreSettings::default()
        })
        .unwrap();
        assert_eq!(lenient.import_families(&families).unwrap(), 4);
    }

    #[test]
    fn test_plain_mappings_load_with_single_source() {
        let store = store();
        store.add_root_mapping(&root("WER"), "warp").unwrap();
        store.add_root_mapping(&root("WER"), "wrist").unwrap();
        let loaded = store.load_families().unwrap();
        assert_eq!(loaded[&root("WER")].source_count, 1);
        assert!(loaded[&root("WER")].gloss.is_none());
    }

    #[test]
    fn test_roots_with_multiple_words_and_stats() {
        let store = store();
        store.add_root_mapping(&root("SAL"), "salary").unwrap();
        store.add_root_mapping(&root("SAL"), "salad").unwrap();
        store.add_root_mapping(&root("SAL"), "saline").unwrap();
        store.add_root_mapping(&root("WER"), "warp").unwrap();
        store.add_root_mapping(&root("WER"), "wrist").unwrap();
        store.add_root_mapping(&root("LONE"), "alone").unwrap();

        let roots = store.roots_with_multiple_words(None).unwrap();
        assert_eq!(roots, vec![(root("SAL"), 3), (root("WER"), 2)]);
        assert_eq!(store.roots_with_multiple_words(Some(1)).unwrap().len(), 1);

        store.record_posted_pair(&pair("salary", "salad"), "p");
        for _ in 0..3 {
            store.record_word_failure("wrist").unwrap();
        }
        let stats = store.stats().unwrap();
        assert_eq!(stats.mappings, 6);
        assert_eq!(stats.roots, 3);
        assert_eq!(stats.multi_word_roots, 2);
        assert_eq!(stats.posted, 1);
        assert_eq!(stats.posted_last_24h, 1);
        assert_eq!(stats.failed_words, 1);
        assert_eq!(stats.problematic_words, 1);
    }
}

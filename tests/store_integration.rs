//! Durability tests for the on-disk etymology store.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{Duration, TimeZone, Utc};
use etymoroot::models::{CandidatePair, CanonicalRootId, RootFamily};
use etymoroot::storage::{EtymologyStore, SqliteEtymologyStore, StoreSettings};
use etymoroot::Error;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn open(dir: &TempDir) -> SqliteEtymologyStore {
    SqliteEtymologyStore::open(dir.path().join("etymology.db"), StoreSettings::default()).unwrap()
}

fn pair(root: &str, w1: &str, w2: &str) -> CandidatePair {
    CandidatePair::new(CanonicalRootId::new(root), w1, w2, None).unwrap()
}

#[test]
fn test_history_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = open(&dir);
        let sal = CanonicalRootId::new("SAL");
        assert!(store.add_root_mapping(&sal, "salary").unwrap());
        assert!(store.add_root_mapping(&sal, "salad").unwrap());
        assert!(store.record_posted_pair(&pair("SAL", "salary", "salad"), "post-1"));
        assert_eq!(store.record_word_failure("hover").unwrap(), 1);
    }

    let store = open(&dir);
    assert!(store.is_pair_posted("salad", "salary").unwrap());
    assert!(store.is_pair_posted("SALARY", " salad").unwrap());
    assert_eq!(
        store
            .get_words_for_root(&CanonicalRootId::new("SAL"))
            .unwrap()
            .len(),
        2
    );
    assert_eq!(store.word_failure("hover").unwrap().unwrap().failure_count, 1);
    assert_eq!(store.record_word_failure("hover").unwrap(), 2);

    let posted = store.posted_pairs().unwrap();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].word1, "salad");
    assert_eq!(posted[0].word2, "salary");
    assert_eq!(posted[0].external_post_id, "post-1");
}

#[test]
fn test_duplicate_post_is_reported_not_overwritten() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store
        .try_record_posted_pair(&pair("SAL", "salary", "salad"), "first")
        .unwrap();

    let err = store
        .try_record_posted_pair(&pair("SAL", "salad", "salary"), "second")
        .unwrap_err();
    assert!(matches!(err, Error::UnrecordedPost { .. }));
    assert!(!store.record_posted_pair(&pair("SAL", "salad", "salary"), "third"));

    let posted = store.posted_pairs().unwrap();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].external_post_id, "first");
}

#[test]
fn test_window_counts_are_inclusive() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

    store
        .try_record_posted_pair_at(&pair("SAL", "salary", "salad"), "a", base)
        .unwrap();
    store
        .try_record_posted_pair_at(&pair("WER", "warp", "wrist"), "b", base + Duration::hours(1))
        .unwrap();
    store
        .try_record_posted_pair_at(&pair("BHEL", "bowl", "bold"), "c", base + Duration::days(2))
        .unwrap();

    assert_eq!(store.get_posts_in_window(base, base + Duration::hours(1)).unwrap(), 2);
    assert_eq!(store.get_posts_in_window(base, base + Duration::days(3)).unwrap(), 3);
    assert_eq!(
        store
            .get_posts_in_window(base + Duration::days(3), base + Duration::days(4))
            .unwrap(),
        0
    );
}

#[test]
fn test_old_failures_are_cleaned_up() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let now = Utc::now();

    store
        .record_word_failure_at("stale", now - Duration::days(40))
        .unwrap();
    store
        .record_word_failure_at("recent", now - Duration::days(2))
        .unwrap();

    assert_eq!(store.cleanup_old_failures(Duration::days(30)).unwrap(), 1);
    assert!(store.word_failure("stale").unwrap().is_none());
    assert!(store.word_failure("recent").unwrap().is_some());
    assert!(matches!(
        store.cleanup_old_failures(Duration::days(-1)),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_stats_after_import() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let families = vec![
        RootFamily::new(CanonicalRootId::new("SAL"), ["salary", "salad", "saline"])
            .with_gloss("salt")
            .with_source_count(3),
        RootFamily::new(CanonicalRootId::new("WER"), ["warp", "wrist"]).with_source_count(2),
        RootFamily::new(CanonicalRootId::new("LONE"), ["alone"]).with_source_count(4),
    ];
    assert_eq!(store.import_families(&families).unwrap(), 5);
    assert_eq!(store.import_families(&families).unwrap(), 0);

    store.record_posted_pair(&pair("SAL", "salary", "salad"), "p");
    for _ in 0..StoreSettings::default().max_word_failures {
        store.record_word_failure("saline").unwrap();
    }
    store.record_word_failure("warp").unwrap();

    let stats = store.stats().unwrap();
    assert_eq!(stats.mappings, 5);
    assert_eq!(stats.roots, 2);
    assert_eq!(stats.multi_word_roots, 2);
    assert_eq!(stats.posted, 1);
    assert_eq!(stats.posted_last_24h, 1);
    assert_eq!(stats.failed_words, 2);
    assert_eq!(stats.problematic_words, 1);

    let loaded = open(&dir).load_families().unwrap();
    assert_eq!(loaded.len(), 2);
    let sal = &loaded[&CanonicalRootId::new("SAL")];
    assert_eq!(sal.gloss.as_deref(), Some("salt"));
    assert_eq!(sal.source_count, 3);
}

#[test]
fn test_concurrent_writers_share_one_store() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(open(&dir));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for j in 0..10 {
                    let root = CanonicalRootId::new(format!("ROOT{i}"));
                    store.add_root_mapping(&root, &format!("word{j}")).unwrap();
                }
                store.record_word_failure("shared").unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.stats().unwrap().mappings, 40);
    assert_eq!(store.word_failure("shared").unwrap().unwrap().failure_count, 4);
}

//! Benchmarks for the root pipeline hot paths.
//!
//! A full dictionary dump runs every etymology through extraction and every
//! captured root through canonicalization, so both need to stay cheap:
//! - Canonicalization: a few microseconds per root
//! - Extraction: tens of microseconds per etymology paragraph
//! - Pair filtering over a few thousand families

// Criterion macros generate items without docs - this is expected for benchmarks
// Benchmarks use expect/unwrap for simplicity - panics are acceptable in benchmarks
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use etymoroot::models::{CanonicalRootId, DictionaryEntry, RootFamily};
use etymoroot::services::{EtymologyExtractor, PairSelectionEngine, RootCanonicalizer};
use etymoroot::storage::{SqliteEtymologyStore, StoreSettings};
use std::hint::black_box;

const RAW_ROOTS: &[&str] = &[
    "*sal-",
    "PIE *bhel-",
    "habban",
    "Proto-Germanic *haftan",
    "*wr̥-idh-",
    "*wer-(2)",
    "from Proto-Indo-European *bʰer-",
    "*deḱ-",
    "BHEL",
    "the",
];

const ETYMOLOGIES: &[&str] = &[
    r#"From Middle English salarie, from Latin salārium, from sal ("salt"), from PIE *sal- ("salt")."#,
    "From Old English habban, from Proto-Germanic *habjaną, from PIE *kh₂pyé-, from *keh₂p- (to seize).",
    "Ultimately from the root *bhel- (to blow, swell). Compare Sanskrit bhalla (bear).",
    "Borrowed from French, of uncertain origin.",
];

fn bench_canonicalize(c: &mut Criterion) {
    let canonicalizer = RootCanonicalizer::default();
    let mut group = c.benchmark_group("canonicalize");

    for raw in RAW_ROOTS {
        group.bench_with_input(BenchmarkId::from_parameter(raw), raw, |b, raw| {
            b.iter(|| canonicalizer.canonicalize(black_box(raw)));
        });
    }
    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let extractor = EtymologyExtractor::default();
    let entries: Vec<DictionaryEntry> = ETYMOLOGIES
        .iter()
        .enumerate()
        .map(|(i, text)| {
            DictionaryEntry::new(format!("word{}", "x".repeat(i)), vec![(*text).to_string()])
        })
        .collect();

    c.bench_function("extract/entries", |b| {
        b.iter(|| {
            entries
                .iter()
                .map(|entry| extractor.extract(black_box(entry)).len())
                .sum::<usize>()
        });
    });
}

fn bench_candidates(c: &mut Criterion) {
    let store = SqliteEtymologyStore::in_memory(StoreSettings::default()).unwrap();
    let engine = PairSelectionEngine::seeded(7);
    let mut group = c.benchmark_group("candidates");

    for family_count in [100_usize, 1_000] {
        let families: Vec<RootFamily> = (0..family_count)
            .map(|i| {
                let words = (0..5).map(|j| format!("w{i}x{j}"));
                RootFamily::new(CanonicalRootId::new(format!("ROOT{i}")), words)
                    .with_source_count(2)
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(family_count),
            &families,
            |b, families| {
                b.iter(|| engine.candidates(families.iter(), &store, false).unwrap().len());
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_canonicalize, bench_extract, bench_candidates);
criterion_main!(benches);

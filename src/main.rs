//! Binary entry point for etymoroot.
//!
//! Thin CLI over the library: build families from a dictionary dump, import
//! them into the store, select and record pairs, and inspect the store.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use chrono::Duration;
use clap::{Parser, Subcommand};
use etymoroot::config::EtymoConfig;
use etymoroot::observability::init_logging;
use etymoroot::services::{
    ConsensusBuilder, CorpusReader, EtymologyExtractor, PairSelectionEngine, RootCanonicalizer,
    audit_families,
};
use etymoroot::storage::{EtymologyStore, FamilySnapshot, SqliteEtymologyStore, StoreSettings};
use etymoroot::{CandidatePair, CanonicalRootId, Canonicalization, RootFamily};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Etymoroot - finds word pairs that share an ancient root.
#[derive(Parser)]
#[command(name = "etymoroot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "ETYMOROOT_CONFIG")]
    config: Option<PathBuf>,

    /// Database path (overrides configuration).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Build root families from a JSONL dictionary dump.
    Build {
        /// Dump path (`.jsonl` or `.jsonl.gz`).
        #[arg(short, long)]
        input: PathBuf,

        /// Snapshot output path (defaults to the configured snapshot).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop after this many entries.
        #[arg(long)]
        max_entries: Option<usize>,

        /// Also import the families into the database.
        #[arg(long)]
        import: bool,
    },

    /// Import a family snapshot into the database.
    Import {
        /// Snapshot path (defaults to the configured snapshot).
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },

    /// Select one fresh pair.
    Select {
        /// Allow affix-trivial pairs.
        #[arg(long)]
        include_trivial: bool,

        /// Seed for reproducible selection.
        #[arg(long)]
        seed: Option<u64>,

        /// Print the pair as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Record a pair as posted.
    Record {
        /// First word.
        word1: String,

        /// Second word.
        word2: String,

        /// Canonical root id.
        #[arg(long)]
        root: String,

        /// Identifier returned by the posting service.
        #[arg(long)]
        external_id: String,

        /// Root gloss.
        #[arg(long)]
        gloss: Option<String>,
    },

    /// Record a generation failure for a word.
    Fail {
        /// The word that failed.
        word: String,
    },

    /// Delete old word failures so those words can be retried.
    Cleanup {
        /// Age in days (defaults to the configured retention).
        #[arg(long)]
        days: Option<u32>,
    },

    /// Show store statistics.
    Stats,

    /// Audit family quality.
    Audit {
        /// Number of families to sample.
        #[arg(long, default_value_t = 100)]
        sample: usize,

        /// Seed for reproducible sampling.
        #[arg(long)]
        seed: Option<u64>,

        /// Audit the database instead of the snapshot.
        #[arg(long)]
        from_store: bool,
    },

    /// Canonicalize raw root strings.
    Canonicalize {
        /// Raw roots.
        #[arg(required = true)]
        roots: Vec<String>,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref(), cli.db.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = init_logging(&config.logging.clone().verbose(cli.verbose)) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Loads configuration: explicit file, else default location, then env overrides.
fn load_config(
    path: Option<&Path>,
    db: Option<PathBuf>,
) -> Result<EtymoConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => EtymoConfig::load_from_file(path)?,
        None => EtymoConfig::load_default(),
    };
    let config = config.with_env_overrides()?;
    Ok(match db {
        Some(db) => config.with_db_path(db),
        None => config,
    })
}

/// Runs the selected command.
fn run_command(command: Commands, config: &EtymoConfig) -> CliResult {
    match command {
        Commands::Build {
            input,
            output,
            max_entries,
            import,
        } => cmd_build(config, &input, output, max_entries, import),
        Commands::Import { snapshot } => cmd_import(config, snapshot),
        Commands::Select {
            include_trivial,
            seed,
            json,
        } => cmd_select(config, include_trivial, seed, json),
        Commands::Record {
            word1,
            word2,
            root,
            external_id,
            gloss,
        } => cmd_record(config, &word1, &word2, root, &external_id, gloss),
        Commands::Fail { word } => cmd_fail(config, &word),
        Commands::Cleanup { days } => cmd_cleanup(config, days),
        Commands::Stats => cmd_stats(config),
        Commands::Audit {
            sample,
            seed,
            from_store,
        } => cmd_audit(config, sample, seed, from_store),
        Commands::Canonicalize { roots } => cmd_canonicalize(config, &roots),
    }
}

fn open_store(config: &EtymoConfig) -> etymoroot::Result<SqliteEtymologyStore> {
    SqliteEtymologyStore::open(&config.db_path, StoreSettings::from_config(config))
}

fn cmd_build(
    config: &EtymoConfig,
    input: &Path,
    output: Option<PathBuf>,
    max_entries: Option<usize>,
    import: bool,
) -> CliResult {
    let extractor = EtymologyExtractor::new(config.extraction);
    let canonicalizer = RootCanonicalizer::from_config(&config.ablaut_rules)?;
    let mut builder = ConsensusBuilder::new(canonicalizer, config.consensus);

    let corpus = CorpusReader::new()
        .with_max_entries(max_entries)
        .build_from_path(input, &extractor, &mut builder)?;
    let result = builder.finish();

    let output = output.unwrap_or_else(|| config.snapshot_path.clone());
    let snapshot = FamilySnapshot::from_families(result.families);
    snapshot.save(&output)?;

    println!("Entries read:      {}", corpus.entries);
    println!("Malformed lines:   {}", corpus.malformed_lines);
    println!("Root mentions:     {}", corpus.mentions);
    println!("Rejected roots:    {}", result.stats.rejected);
    println!("Candidate roots:   {}", result.stats.candidate_roots);
    println!("Admitted families: {}", result.stats.admitted);
    println!("Snapshot:          {}", output.display());

    if import {
        let families: Vec<RootFamily> = snapshot.into_families().into_values().collect();
        let inserted = open_store(config)?.import_families(&families)?;
        println!("Imported mappings: {inserted}");
    }
    Ok(())
}

fn cmd_import(config: &EtymoConfig, snapshot: Option<PathBuf>) -> CliResult {
    let path = snapshot.unwrap_or_else(|| config.snapshot_path.clone());
    let snapshot = FamilySnapshot::load(&path)?;
    let loaded = snapshot.len();
    let snapshot = snapshot.corroborated(config.consensus.min_sources);

    let families: Vec<RootFamily> = snapshot.into_families().into_values().collect();
    let inserted = open_store(config)?.import_families(&families)?;
    println!(
        "Imported {} of {loaded} families ({inserted} new mappings)",
        families.len()
    );
    Ok(())
}

/// Families for selection: the database, or the snapshot when the database is empty.
fn selection_families(
    config: &EtymoConfig,
    store: &SqliteEtymologyStore,
) -> Result<BTreeMap<CanonicalRootId, RootFamily>, Box<dyn std::error::Error>> {
    let families = store.load_families()?;
    if !families.is_empty() || !config.snapshot_path.exists() {
        return Ok(families);
    }
    tracing::info!(path = %config.snapshot_path.display(), "Database empty, using snapshot");
    Ok(FamilySnapshot::load(&config.snapshot_path)?
        .corroborated(config.consensus.min_sources)
        .into_families())
}

fn cmd_select(
    config: &EtymoConfig,
    include_trivial: bool,
    seed: Option<u64>,
    json: bool,
) -> CliResult {
    let store = open_store(config)?;
    let families = selection_families(config, &store)?;
    let mut engine = seed.map_or_else(PairSelectionEngine::uniform, PairSelectionEngine::seeded);
    let include_trivial = include_trivial || config.selection.include_trivial;

    match engine.select_fresh_pair(families.values(), &store, include_trivial)? {
        Some(pair) if json => println!("{}", serde_json::to_string_pretty(&pair)?),
        Some(pair) => println!("{pair}"),
        None => println!("No fresh pairs available"),
    }
    Ok(())
}

fn cmd_record(
    config: &EtymoConfig,
    word1: &str,
    word2: &str,
    root: String,
    external_id: &str,
    gloss: Option<String>,
) -> CliResult {
    let pair = CandidatePair::new(CanonicalRootId::new(root), word1, word2, gloss)?;
    open_store(config)?.try_record_posted_pair(&pair, external_id)?;
    println!("Recorded {pair} as {external_id}");
    Ok(())
}

fn cmd_fail(config: &EtymoConfig, word: &str) -> CliResult {
    let store = open_store(config)?;
    let count = store.record_word_failure(word)?;
    let status = if count >= store.max_word_failures() {
        " (now excluded)"
    } else {
        ""
    };
    println!("{word}: {count} failure(s){status}");
    Ok(())
}

fn cmd_cleanup(config: &EtymoConfig, days: Option<u32>) -> CliResult {
    let days = days.unwrap_or(config.failure_retention_days);
    let deleted = open_store(config)?.cleanup_old_failures(Duration::days(i64::from(days)))?;
    println!("Deleted {deleted} failure record(s) older than {days} day(s)");
    Ok(())
}

fn cmd_stats(config: &EtymoConfig) -> CliResult {
    let store = open_store(config)?;
    let stats = store.stats()?;

    println!("Database:          {}", config.db_path.display());
    println!("Root mappings:     {}", stats.mappings);
    println!("Roots:             {}", stats.roots);
    println!("Multi-word roots:  {}", stats.multi_word_roots);
    println!("Posted pairs:      {}", stats.posted);
    println!("Posted (24h):      {}", stats.posted_last_24h);
    println!("Failed words:      {}", stats.failed_words);
    println!("Excluded words:    {}", stats.problematic_words);

    let top = store.roots_with_multiple_words(Some(5))?;
    if !top.is_empty() {
        println!("Largest families:");
        for (root, words) in top {
            println!("  {root}: {words} words");
        }
    }
    Ok(())
}

fn cmd_audit(config: &EtymoConfig, sample: usize, seed: Option<u64>, from_store: bool) -> CliResult {
    let families = if from_store {
        open_store(config)?.load_families()?
    } else {
        FamilySnapshot::load(&config.snapshot_path)?.into_families()
    };
    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let report = audit_families(families.values(), sample, &mut rng);

    for root in &report.roots {
        let gloss = root
            .gloss
            .as_deref()
            .map(|g| format!(" (\"{g}\")"))
            .unwrap_or_default();
        println!("{}{gloss} (sources: {}):", root.root, root.source_count);
        for example in &root.examples {
            let flag = if example.trivial { "[trivial] " } else { "" };
            println!("    {flag}{} + {}", example.word1, example.word2);
        }
        if root.trivial_pairs > 0 {
            println!("    ({}/{} pairs are trivial)", root.trivial_pairs, root.pairs);
        }
    }

    println!();
    println!("Total roots:        {}", report.total_roots);
    println!("Multi-word roots:   {}", report.multi_word_roots);
    println!("Sampled roots:      {}", report.sampled_roots);
    println!("Pairs analyzed:     {}", report.total_pairs);
    println!(
        "Trivial pairs:      {} ({:.1}%)",
        report.trivial_pairs,
        report.trivial_percentage()
    );
    println!(
        "Short-root pairs:   {} ({:.1}%)",
        report.short_root_pairs,
        report.short_root_percentage()
    );
    println!("Verdict:            {}", report.verdict());
    Ok(())
}

fn cmd_canonicalize(config: &EtymoConfig, roots: &[String]) -> CliResult {
    let canonicalizer = RootCanonicalizer::from_config(&config.ablaut_rules)?;
    for raw in roots {
        match canonicalizer.canonicalize(raw) {
            Canonicalization::Accepted(id) => println!("{raw} -> {id}"),
            Canonicalization::Rejected(reason) => println!("{raw} -> rejected ({reason})"),
        }
    }
    Ok(())
}

//! # Etymoroot
//!
//! Discovers pairs of modern words that descend from a shared ancient root and
//! keeps a durable record so no pair is suggested twice.
//!
//! ## Pipeline
//!
//! - [`services::EtymologyExtractor`] scans etymology prose for root mentions
//! - [`services::RootCanonicalizer`] folds spelling and ablaut variants into one id
//! - [`services::ConsensusBuilder`] admits root families attested by independent sources
//! - [`services::TrivialityFilter`] drops pairs that are plain affixation
//! - [`storage::SqliteEtymologyStore`] remembers mappings, posted pairs and failures
//! - [`services::PairSelectionEngine`] picks one fresh pair per posting cycle
//!
//! ## Example
//!
//! ```rust,ignore
//! use etymoroot::services::{ConsensusBuilder, PairSelectionEngine, RootCanonicalizer};
//! use etymoroot::storage::{EtymologyStore, SqliteEtymologyStore, StoreSettings};
//!
//! let families = ConsensusBuilder::with_defaults(RootCanonicalizer::default()).build(mentions);
//! let store = SqliteEtymologyStore::in_memory(StoreSettings::default())?;
//! let mut engine = PairSelectionEngine::uniform();
//! if let Some(pair) = engine.select_fresh_pair(families.values(), &store, false)? {
//!     // post it somewhere, then:
//!     store.record_posted_pair(&pair, "external-id");
//! }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::EtymoConfig;
pub use models::{
    CandidatePair, CanonicalRootId, Canonicalization, DictionaryEntry, PairKey, RawRootMention,
    RejectionReason, RootFamily,
};
pub use services::{
    ConsensusBuilder, EtymologyExtractor, PairSelectionEngine, RootCanonicalizer, TrivialityFilter,
};
pub use storage::{EtymologyStore, SqliteEtymologyStore};

/// Error type for etymoroot operations.
///
/// Rejected roots, empty extractions, families below the consensus threshold
/// and an exhausted candidate pool are ordinary data and never surface here.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Bad configuration values, malformed pairs, uncompilable ablaut rules |
/// | `OperationFailed` | I/O, JSON/TOML parsing, opening the database, read queries |
/// | `TransactionFailed` | A durable write could not be committed |
/// | `UnrecordedPost` | An external post succeeded but its record could not be written |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A non-transactional operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A durable write could not commit and was rolled back.
    ///
    /// Callers must not assume any part of the write took effect.
    #[error("transaction '{operation}' failed: {cause}")]
    TransactionFailed {
        /// The operation whose transaction failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A pair was posted externally but recording it failed.
    ///
    /// Retrying the external action risks a duplicate post; this needs
    /// reconciliation rather than a blind retry.
    #[error("post {external_id} of '{word1}'/'{word2}' succeeded but was not recorded: {cause}")]
    UnrecordedPost {
        /// First word of the posted pair.
        word1: String,
        /// Second word of the posted pair.
        word2: String,
        /// Identifier assigned by the external posting service.
        external_id: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for etymoroot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Falls back to 0 if the system clock is before the Unix epoch.
#[must_use]
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp().max(0)
}

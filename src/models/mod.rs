//! Data models for etymoroot.
//!
//! This module contains the core data structures that flow through the
//! extraction, consensus and selection pipeline.

mod family;
mod mention;
mod pair;
pub(crate) mod root;

pub use family::{RootFamily, StoredFamily};
pub use mention::{DictionaryEntry, EntrySense, RawRootMention};
pub use pair::{CandidatePair, PairKey, PostedPairRecord, WordFailureRecord, normalize_word};
pub use root::{CanonicalRootId, Canonicalization, RejectionReason};

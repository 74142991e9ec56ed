//! Pipeline services.
//!
//! Extraction and canonicalization are pure; consensus building aggregates
//! in memory; selection reads the store and never writes to it.

mod audit;
mod canonicalizer;
mod consensus;
mod corpus;
mod extraction;
mod selection;
mod triviality;

pub use audit::{AuditExample, AuditReport, AuditVerdict, RootAudit, audit_families};
pub use canonicalizer::{AblautRule, AblautTable, RootCanonicalizer};
pub use consensus::{ConsensusBuilder, ConsensusResult, ConsensusStats};
pub use corpus::{CorpusReader, CorpusStats};
pub use extraction::{EtymologyExtractor, ExtractedRoot, RootPattern};
pub use selection::{
    DivergenceScorer, MaxDivergence, PairSelectionEngine, RankingStrategy, UniformRandom,
};
pub use triviality::TrivialityFilter;

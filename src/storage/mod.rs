//! Storage layer.
//!
//! - **Etymology store**: durable root mappings, posted-pair history and
//!   word failure counters behind the [`EtymologyStore`] trait
//! - **Snapshots**: JSON/gzip files carrying consensus-built families
//!   between the corpus build and selection

// Dropping the connection guard earlier buys nothing in single-statement closures.
#![allow(clippy::significant_drop_tightening)]

pub mod etymology;
pub mod snapshot;
pub mod sqlite;

pub use etymology::{EtymologyStore, SqliteEtymologyStore, StoreSettings, StoreStats};
pub use snapshot::FamilySnapshot;

//! Etymology storage: root mappings, posted-pair history, word failures.

mod sqlite;
mod traits;

pub use sqlite::{SqliteEtymologyStore, StoreSettings};
pub use traits::{EtymologyStore, StoreStats};

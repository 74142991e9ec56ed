//! Shared `SQLite` infrastructure.
//!
//! - [`connection`]: mutex handling, pragmas, read/transaction wrappers
//! - [`metrics`]: per-operation counters and latency histograms

mod connection;
mod metrics;

pub use connection::{
    acquire_lock, configure_connection, open_connection, open_in_memory, with_read,
    with_transaction,
};
pub use metrics::record_operation_metrics;

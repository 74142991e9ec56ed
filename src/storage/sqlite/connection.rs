//! Connection handling for the `SQLite` store.
//!
//! Mutex acquisition with poison recovery, connection pragmas, and the
//! read/write wrappers every store operation goes through.

use super::record_operation_metrics;
use crate::{Error, Result};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

/// Acquires the connection mutex, recovering from poison.
///
/// A panic inside a previous critical section leaves the connection usable,
/// so the guard is recovered and the event is logged and counted.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("SQLite mutex was poisoned, recovering");
            metrics::counter!("sqlite_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Applies connection pragmas.
///
/// - **WAL mode**: readers do not block the single writer
/// - **NORMAL synchronous**: durable at checkpoint, fast commits
/// - **`busy_timeout`**: wait up to 5 seconds on a locked database
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if a pragma cannot be applied.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    // journal_mode answers with the resulting mode as a row
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))
        .map_err(|e| pragma_error("journal_mode", &e))?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(|e| pragma_error("synchronous", &e))?;
    conn.pragma_update(None, "busy_timeout", 5000)
        .map_err(|e| pragma_error("busy_timeout", &e))?;
    Ok(())
}

fn pragma_error(pragma: &str, e: &rusqlite::Error) -> Error {
    Error::OperationFailed {
        operation: format!("pragma_{pragma}"),
        cause: e.to_string(),
    }
}

/// Opens a file-backed connection, creating parent directories.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the directory or database cannot be
/// created, or the pragmas fail.
pub fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
            operation: "create_database_dir".to_string(),
            cause: format!("{}: {e}", parent.display()),
        })?;
    }

    let conn = Connection::open(path).map_err(|e| Error::OperationFailed {
        operation: "open_database".to_string(),
        cause: format!("{}: {e}", path.display()),
    })?;
    configure_connection(&conn)?;
    Ok(conn)
}

/// Opens an in-memory connection.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if `SQLite` cannot allocate the database.
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(|e| Error::OperationFailed {
        operation: "open_database_memory".to_string(),
        cause: e.to_string(),
    })
}

/// Runs a read outside any explicit transaction.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the query fails.
pub fn with_read<T, F>(conn: &Mutex<Connection>, operation: &'static str, f: F) -> Result<T>
where
    F: FnOnce(&Connection) -> rusqlite::Result<T>,
{
    let start = Instant::now();
    let guard = acquire_lock(conn);
    let result = f(&*guard).map_err(|e| Error::OperationFailed {
        operation: operation.to_string(),
        cause: e.to_string(),
    });
    record_operation_metrics("sqlite", operation, start, status(&result));
    result
}

/// Runs a write inside one `IMMEDIATE` transaction.
///
/// Commits when `f` succeeds; any error rolls the transaction back.
///
/// # Errors
///
/// Returns [`Error::TransactionFailed`] if the transaction cannot begin, `f`
/// fails, or the commit fails.
pub fn with_transaction<T, F>(conn: &Mutex<Connection>, operation: &'static str, f: F) -> Result<T>
where
    F: FnOnce(&Transaction<'_>) -> rusqlite::Result<T>,
{
    let start = Instant::now();
    let mut guard = acquire_lock(conn);

    let result = guard
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .and_then(|tx| {
            let value = f(&tx)?;
            tx.commit()?;
            Ok(value)
        })
        .map_err(|e| {
            tracing::warn!(operation, error = %e, "Transaction rolled back");
            Error::TransactionFailed {
                operation: operation.to_string(),
                cause: e.to_string(),
            }
        });

    record_operation_metrics("sqlite", operation, start, status(&result));
    result
}

const fn status<T>(result: &Result<T>) -> &'static str {
    if result.is_ok() { "success" } else { "error" }
}

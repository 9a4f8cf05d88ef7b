//! Store driver: opens/creates the database, applies the schema, and owns
//! the single concurrency primitive every mutating operation uses.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{Connection, Transaction};

use crate::error::Result;
use crate::schema;

/// A long-lived handle onto one embedded SQLite database.
///
/// `Store` wraps a single `rusqlite::Connection` behind a `Mutex`, so it is
/// `Send + Sync` and can be shared across threads within one process (e.g.
/// behind an `Arc<Store>`); transactions serialize writers via SQLite's own
/// locking. Construct with [`Store::open`] or [`Store::open_in_memory`] and
/// pass the handle explicitly -- it is never hidden in process-wide mutable
/// state, so tests can instantiate isolated stores freely.
#[derive(Debug)]
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Opens or creates the database at `path`, creating parent directories
    /// as needed, and idempotently installs the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::configure(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory database with the same schema and semantics, no
    /// durability. Used by the test suite and by embedders that want no
    /// on-disk footprint.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::apply(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn configure(conn: &Connection) -> Result<()> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        schema::apply(conn)?;
        Ok(())
    }

    /// Runs `f` inside a serializable write transaction (`BEGIN IMMEDIATE`,
    /// acquiring the write lock up front to avoid upgrade deadlocks),
    /// committing on `Ok` and rolling back on `Err`. The transaction's
    /// failure propagates to the caller unchanged.
    ///
    /// Callers may bracket their own multi-operation compound actions with
    /// this primitive; a failure from inside rolls the whole bracket back.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut conn = self.conn.lock().expect("store connection mutex poisoned");
        tracing::trace!("beginning transaction");
        let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                tracing::trace!("transaction committed");
                Ok(value)
            }
            Err(err) => {
                // Explicit rollback; dropping `tx` would also roll back, but
                // being explicit keeps the failure path easy to follow and
                // lets us log before the guard runs.
                let _ = tx.rollback();
                tracing::debug!(error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }

    /// Consumes the handle. `rusqlite::Connection`'s `Drop` already closes
    /// the underlying file; this exists so callers have an explicit point
    /// to release a `Store` out of a long-lived `Arc`, matching the core
    /// API's `close` entry.
    pub fn close(self) {}
}

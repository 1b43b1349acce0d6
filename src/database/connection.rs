/*!
 * Managed database connections.
 *
 * A [`ManagedConnection`] is the unit-of-work handle the lifecycle
 * orchestrator hands out: it wraps a SQLite connection with thread-safe
 * access patterns using tokio's spawn_blocking, and reports every
 * successful write back to the orchestrator so a backup cycle can run.
 *
 * The post-write sequence closes the underlying handle out from under the
 * wrapper; the next operation reopens it lazily.
 */

use anyhow::{Context, Result};
use log::{debug, warn};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::database::schema::DatabaseContext;
use crate::persistence::lifecycle::DbLifecycle;

/// How long a connection waits on a file lock held by an in-flight backup
const BUSY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database: {:?}", db_path))?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .context("Failed to set busy timeout")?;
    Ok(conn)
}

/// Shared slot holding the underlying engine connection. Empty after the
/// post-write sequence has closed the handle; refilled lazily on next use.
pub(crate) type ConnectionSlot = Arc<Mutex<Option<Connection>>>;

/// Take the connection out of a slot and close its file handle.
pub(crate) fn close_slot(slot: &ConnectionSlot) {
    let conn = match slot.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    };

    if let Some(conn) = conn {
        if let Err((_, e)) = conn.close() {
            warn!("Failed to close database handle: {}", e);
        }
    }
}

/// Database connection wrapper handed out by the lifecycle orchestrator
pub struct ManagedConnection<C: DatabaseContext> {
    /// Path to the live database file
    db_path: PathBuf,
    /// Thread-safe connection slot
    slot: ConnectionSlot,
    /// Orchestrator notified of completed writes
    lifecycle: DbLifecycle<C>,
}

impl<C: DatabaseContext> ManagedConnection<C> {
    /// Open (or create) the database file and wrap it
    pub(crate) async fn open(db_path: PathBuf, lifecycle: DbLifecycle<C>) -> Result<Self> {
        let path = db_path.clone();
        let conn = tokio::task::spawn_blocking(move || open_connection(&path))
            .await
            .context("Database open task panicked")??;

        Ok(Self {
            db_path,
            slot: Arc::new(Mutex::new(Some(conn))),
            lifecycle,
        })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Execute a read-only database operation with the connection
    ///
    /// This method acquires the slot lock and executes the provided closure
    /// with access to the connection. For async contexts, use `execute_async`.
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        run_with_slot(&self.slot, &self.db_path, f)
    }

    /// Execute a read-only database operation asynchronously using
    /// spawn_blocking
    ///
    /// This is the preferred method for async contexts as it prevents
    /// blocking the async runtime.
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let slot = Arc::clone(&self.slot);
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || run_with_slot(&slot, &db_path, f))
            .await
            .context("Database task panicked")?
    }

    /// Execute a write operation asynchronously and report its completion.
    ///
    /// The closure returns the number of rows affected. On success the
    /// lifecycle orchestrator is notified and launches the post-write
    /// backup cycle; the writer is not blocked on it.
    pub async fn write_async<F>(&self, f: F) -> Result<usize>
    where
        F: FnOnce(&Connection) -> Result<usize> + Send + 'static,
    {
        let slot = Arc::clone(&self.slot);
        let db_path = self.db_path.clone();

        let rows = tokio::task::spawn_blocking(move || run_with_slot(&slot, &db_path, f))
            .await
            .context("Database write task panicked")??;

        self.lifecycle.write_completed(Arc::clone(&self.slot), rows);

        Ok(rows)
    }

    /// Close the underlying file handle; the next operation reopens it
    pub fn close(&self) {
        close_slot(&self.slot);
    }
}

/// Run `f` against the slot's connection, reopening the handle if the
/// post-write sequence closed it.
fn run_with_slot<T>(
    slot: &Mutex<Option<Connection>>,
    db_path: &Path,
    f: impl FnOnce(&Connection) -> Result<T>,
) -> Result<T> {
    let mut guard = slot
        .lock()
        .map_err(|e| anyhow::anyhow!("Failed to acquire database lock: {}", e))?;

    if guard.is_none() {
        debug!("Reopening database handle: {:?}", db_path);
        *guard = Some(open_connection(db_path)?);
    }

    let Some(conn) = guard.as_ref() else {
        return Err(anyhow::anyhow!("Database handle unavailable"));
    };

    f(conn)
}

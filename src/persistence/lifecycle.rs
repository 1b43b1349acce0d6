/*!
 * Context lifecycle orchestrator.
 *
 * Guarantees that no connection is handed out before the one-time startup
 * restore has completed, that the live database file exists with its schema
 * on first use, and that every completed write triggers exactly one
 * backup-and-sync cycle.
 *
 * Decoupling "write completes" from "backup is durably stored" keeps
 * interactive writes off the persistent-store round-trip; the window until
 * the spawned push completes is bounded by [`DbLifecycle::shutdown`].
 */

use anyhow::Result;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::database::connection::{ConnectionSlot, ManagedConnection, close_slot};
use crate::database::schema::DatabaseContext;
use crate::persistence::registry::FilenameRegistry;
use crate::persistence::status::SyncStatus;
use crate::persistence::swap::SwapService;
use crate::persistence::sync::StorageSyncService;
use crate::storage::workdir::WorkDir;

/// Shared state behind the cloneable orchestrator handle
struct LifecycleInner<C: DatabaseContext> {
    /// Engine connection string the filename is resolved from
    connection_string: String,
    /// Shared filename registry
    registry: Arc<FilenameRegistry>,
    /// Atomic swap primitive
    swap: SwapService,
    /// Bridge to the persistent blob store
    sync: Arc<StorageSyncService>,
    /// Ephemeral working directory holding the live file
    workdir: WorkDir,
    /// One-shot startup restore task, consumed by the first await
    startup: AsyncMutex<Option<JoinHandle<SyncStatus>>>,
    /// Most recently completed sync attempt
    last_status: Mutex<SyncStatus>,
    /// Whether the schema has been ensured on this instance
    schema_ready: AtomicBool,
    /// In-flight post-write backup cycles, drained by `shutdown`
    pending_backups: Mutex<Vec<JoinHandle<Result<SyncStatus>>>>,
    _context: PhantomData<C>,
}

/// Lifecycle orchestrator for one logical database.
///
/// Construction spawns the startup restore task; the first [`open`] call
/// awaits it before handing out a connection. Restore failure is non-fatal
/// and simply means no prior state was recovered.
///
/// Cloning yields another handle to the same orchestrator. Must be
/// constructed from within a tokio runtime.
///
/// [`open`]: DbLifecycle::open
pub struct DbLifecycle<C: DatabaseContext> {
    inner: Arc<LifecycleInner<C>>,
}

impl<C: DatabaseContext> Clone for DbLifecycle<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: DatabaseContext> DbLifecycle<C> {
    /// Create the orchestrator and kick off the startup restore task
    pub fn new(
        connection_string: impl Into<String>,
        registry: Arc<FilenameRegistry>,
        sync: Arc<StorageSyncService>,
        workdir: WorkDir,
    ) -> Self {
        let connection_string = connection_string.into();
        let swap = SwapService::new();

        let startup = tokio::spawn(Self::restore_sequence(
            connection_string.clone(),
            Arc::clone(&registry),
            Arc::clone(&sync),
            swap,
            workdir.clone(),
        ));

        Self {
            inner: Arc::new(LifecycleInner {
                connection_string,
                registry,
                swap,
                sync,
                workdir,
                startup: AsyncMutex::new(Some(startup)),
                last_status: Mutex::new(SyncStatus::NotRun),
                schema_ready: AtomicBool::new(false),
                pending_backups: Mutex::new(Vec::new()),
                _context: PhantomData,
            }),
        }
    }

    /// Open a managed connection to the live database file.
    ///
    /// The first call process-wide blocks until the outstanding restore
    /// task finishes; the first successful open also ensures the schema
    /// exists. Every connection handed out reports successful writes back
    /// to this orchestrator.
    pub async fn open(&self) -> Result<ManagedConnection<C>> {
        self.check_startup_task().await;

        let filename = self
            .inner
            .registry
            .resolve::<C>(&self.inner.connection_string);
        let db_path = self.inner.workdir.path_of(&filename);

        let conn = ManagedConnection::open(db_path, self.clone()).await?;

        if !self.inner.schema_ready.load(Ordering::Acquire) {
            conn.execute_async(|c| C::create_schema(c)).await?;
            self.inner.schema_ready.store(true, Ordering::Release);
        }

        Ok(conn)
    }

    /// The status of the most recently completed sync attempt
    pub fn last_status(&self) -> SyncStatus {
        *self.inner.last_status.lock()
    }

    /// Opaque retrievable reference to the current persisted snapshot, or
    /// an empty string if none exists
    pub async fn download_link(&self) -> Result<String> {
        let filename = self
            .inner
            .registry
            .resolve::<C>(&self.inner.connection_string);
        self.inner
            .sync
            .generate_download_link(&format!("{}_backup", filename))
            .await
    }

    /// Await the startup restore task and all in-flight backup cycles.
    ///
    /// Overlapping pushes against the same store key have no defined
    /// winner; draining here bounds that window before the process exits.
    pub async fn shutdown(&self) {
        self.check_startup_task().await;

        let tasks: Vec<_> = self.inner.pending_backups.lock().drain(..).collect();
        for task in tasks {
            match task.await {
                Ok(Ok(status)) => debug!("Backup cycle finished: {}", status),
                Ok(Err(e)) => warn!("Backup cycle failed: {:#}", e),
                Err(e) => warn!("Backup cycle panicked: {}", e),
            }
        }
    }

    /// Launch the post-write backup cycle for a completed write.
    ///
    /// Fire-and-forget from the writer's perspective; the join handle is
    /// retained so `shutdown` can observe failures.
    pub(crate) fn write_completed(&self, slot: ConnectionSlot, rows: usize) {
        let this = self.clone();
        let task = tokio::spawn(async move { this.backup_cycle(slot, rows).await });
        self.inner.pending_backups.lock().push(task);
    }

    /// One-time startup restore: pull the persisted backup (if any) and
    /// materialize it as the live database file.
    async fn restore_sequence(
        connection_string: String,
        registry: Arc<FilenameRegistry>,
        sync: Arc<StorageSyncService>,
        swap: SwapService,
        workdir: WorkDir,
    ) -> SyncStatus {
        let filename = registry.resolve::<C>(&connection_string);
        let backup_name = format!("{}_backup", filename);

        let status = match sync.restore(&backup_name).await {
            Ok(status) => status,
            Err(e) => {
                warn!("Restore lookup failed: {:#}", e);
                return SyncStatus::NotFound;
            }
        };

        if status == SyncStatus::Restored {
            let source = workdir.path_of(&backup_name);
            let dest = workdir.path_of(&filename);
            match swap.swap(&source, &dest).await {
                Ok(()) => info!("Restored persisted database into {}", filename),
                Err(e) => {
                    warn!("Failed to materialize restored backup: {}", e);
                    return SyncStatus::NotFound;
                }
            }
        }

        status
    }

    /// Consume the startup task if it is still outstanding
    async fn check_startup_task(&self) {
        let mut slot = self.inner.startup.lock().await;
        if let Some(task) = slot.take() {
            match task.await {
                Ok(status) => *self.inner.last_status.lock() = status,
                Err(e) => {
                    warn!("Startup restore task failed: {}", e);
                    *self.inner.last_status.lock() = SyncStatus::NotFound;
                }
            }
        }
    }

    /// Post-write sequence: close the writer's handle, guard against an
    /// unconsumed startup task, then snapshot and push the live file.
    async fn backup_cycle(&self, slot: ConnectionSlot, rows: usize) -> Result<SyncStatus> {
        close_slot(&slot);
        self.check_startup_task().await;

        if rows == 0 {
            debug!("Write affected no rows, skipping backup");
            return Ok(self.last_status());
        }

        let filename = self
            .inner
            .registry
            .resolve::<C>(&self.inner.connection_string);
        let backup_name = format!("{}_backup-{}", filename, unique_suffix());

        let live = self.inner.workdir.path_of(&filename);
        let snapshot = self.inner.workdir.path_of(&backup_name);
        self.inner.swap.swap(&live, &snapshot).await?;

        let status = match self.inner.sync.push(&backup_name).await {
            Ok(status) => status,
            Err(e) => {
                warn!("Failed to push backup {}: {:#}", backup_name, e);
                SyncStatus::NotFound
            }
        };

        *self.inner.last_status.lock() = status;
        Ok(status)
    }
}

/// Unique suffix for an ephemeral backup filename, so an in-flight push
/// never collides with a newly taken snapshot
fn unique_suffix() -> String {
    Uuid::new_v4()
        .to_string()
        .split('-')
        .next()
        .map(str::to_owned)
        .unwrap_or_default()
}

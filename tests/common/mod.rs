/*!
 * Common test utilities for the sqlkeep test suite
 */

use anyhow::Result;
use std::sync::Arc;
use tempfile::TempDir;

use sqlkeep::database::TodoContext;
use sqlkeep::persistence::{DbLifecycle, FilenameRegistry, StorageSyncService};
use sqlkeep::storage::{BlobStore, MemoryBlobStore, WorkDir};

/// Connection string used by the test lifecycles
pub const CONNECTION_STRING: &str = "Data Source=todos.sqlite3";

/// Logical store key the connection string resolves to
pub const LOGICAL_NAME: &str = "todos.sqlite3";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a working directory rooted at the given temp dir
pub fn create_workdir(dir: &TempDir) -> Result<WorkDir> {
    WorkDir::new(dir.path())
}

/// Creates a sync service over the given working directory and store
pub fn create_sync_service(
    workdir: WorkDir,
    store: &Arc<MemoryBlobStore>,
) -> Arc<StorageSyncService> {
    let store = Arc::clone(store) as Arc<dyn BlobStore>;
    Arc::new(StorageSyncService::new(workdir, store))
}

/// Creates a lifecycle orchestrator with a fresh registry over the given
/// working directory and store
pub fn create_lifecycle(
    workdir: WorkDir,
    store: &Arc<MemoryBlobStore>,
) -> DbLifecycle<TodoContext> {
    let sync = create_sync_service(workdir.clone(), store);
    DbLifecycle::new(
        CONNECTION_STRING,
        Arc::new(FilenameRegistry::new()),
        sync,
        workdir,
    )
}

/*!
 * Persistent store sync service.
 *
 * Moves a single named file between the ephemeral working filesystem and
 * the persistent blob store. Blobs are keyed by the logical filename, i.e.
 * the working filename with its `_backup...` suffix stripped.
 */

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

use crate::persistence::status::SyncStatus;
use crate::storage::store::BlobStore;
use crate::storage::workdir::WorkDir;

/// Delay before reading a just-written working file, letting the engine's
/// write settle before the bytes are read back for a push
const SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Suffix marking a working file as a backup snapshot
const BACKUP_SUFFIX: &str = "_backup";

/// Bridges the ephemeral working filesystem and the persistent blob store.
pub struct StorageSyncService {
    workdir: WorkDir,
    store: Arc<dyn BlobStore>,
}

impl StorageSyncService {
    /// Create a sync service over the given working directory and store
    pub fn new(workdir: WorkDir, store: Arc<dyn BlobStore>) -> Self {
        Self { workdir, store }
    }

    /// The working directory this service reads and writes
    pub fn workdir(&self) -> &WorkDir {
        &self.workdir
    }

    /// Pull the persisted blob for `filename` into the working filesystem.
    ///
    /// Looks up the logical counterpart of `filename` in the store; if
    /// found, writes its bytes at `filename` and returns [`SyncStatus::Restored`].
    /// Returns [`SyncStatus::NotFound`] and performs no write otherwise.
    pub async fn restore(&self, filename: &str) -> Result<SyncStatus> {
        let key = logical_name(filename);

        match self.store.get(key).await? {
            Some(bytes) => {
                info!("Restoring {} bytes into {}", bytes.len(), filename);
                self.workdir
                    .write_file(filename, &bytes)
                    .with_context(|| format!("Failed to restore blob into {}", filename))?;
                Ok(SyncStatus::Restored)
            }
            None => {
                debug!("No persisted blob found for {}", key);
                Ok(SyncStatus::NotFound)
            }
        }
    }

    /// Push the working file `filename` into the persistent store.
    ///
    /// If the file exists it is read (after a short settle delay), stored
    /// under the stripped logical name overwriting any previous blob, and
    /// deleted from the working filesystem; returns [`SyncStatus::Pushed`].
    /// Returns [`SyncStatus::NotFound`] if the file does not exist.
    pub async fn push(&self, filename: &str) -> Result<SyncStatus> {
        if !self.workdir.exists(filename) {
            debug!("Nothing to push, {} does not exist", filename);
            return Ok(SyncStatus::NotFound);
        }

        tokio::time::sleep(SETTLE_DELAY).await;

        let bytes = self
            .workdir
            .read_file(filename)
            .with_context(|| format!("Failed to read backup file {}", filename))?;
        let key = logical_name(filename);

        debug!("Pushing {} bytes from {} to store key {}", bytes.len(), filename, key);
        self.store.put(key, bytes).await?;

        self.workdir
            .delete_file(filename)
            .with_context(|| format!("Failed to delete pushed backup file {}", filename))?;

        Ok(SyncStatus::Pushed)
    }

    /// Produce an opaque retrievable reference to the persisted blob for
    /// `filename`, or an empty string if none exists. Never mutates store
    /// state.
    pub async fn generate_download_link(&self, filename: &str) -> Result<String> {
        let key = logical_name(filename);

        match self.store.get(key).await? {
            Some(bytes) => Ok(format!(
                "data:application/octet-stream;base64,{}",
                BASE64.encode(bytes)
            )),
            None => Ok(String::new()),
        }
    }
}

/// Strip the `_backup...` suffix off a working filename, yielding the
/// logical name used as the store key.
pub fn logical_name(filename: &str) -> &str {
    match filename.find(BACKUP_SUFFIX) {
        Some(idx) => &filename[..idx],
        None => filename,
    }
}

/*!
 * Persistent blob store collaborator.
 *
 * The blob store is the only storage surface that survives environment
 * reloads. It speaks whole-blob read/write keyed by logical filename and is
 * never usable as a live database file.
 */

use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::StoreError;

/// Whole-blob persistent storage keyed by logical filename.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the current bytes stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `bytes` under `key`, overwriting any previous blob
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;
}

/// Blob store backed by a directory that survives reloads.
///
/// Each blob is a single file named after its key, written atomically
/// (temp file then rename) so a reload never observes a half-written blob.
#[derive(Debug, Clone)]
pub struct DirectoryBlobStore {
    root: PathBuf,
}

impl DirectoryBlobStore {
    /// Open (creating if needed) a directory-backed store at `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl BlobStore for DirectoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.blob_path(key);

        tokio::task::spawn_blocking(move || {
            if !path.is_file() {
                return Ok(None);
            }
            fs::read(&path).map(Some).map_err(StoreError::Io)
        })
        .await
        .map_err(|e| StoreError::TaskFailed(e.to_string()))?
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let root = self.root.clone();
        let path = self.blob_path(key);

        tokio::task::spawn_blocking(move || {
            let mut tmp = tempfile::NamedTempFile::new_in(&root)?;
            tmp.write_all(&bytes)?;
            tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
            debug!("Stored {} bytes at {:?}", bytes.len(), path);
            Ok(())
        })
        .await
        .map_err(|e| StoreError::TaskFailed(e.to_string()))?
    }
}

/// In-memory blob store for testing.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with the given blobs
    pub fn with_blobs<I>(blobs: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<u8>)>,
    {
        Self {
            blobs: Mutex::new(blobs.into_iter().collect()),
        }
    }

    /// Whether a blob exists under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.blobs.lock().contains_key(key)
    }

    /// Number of blobs currently stored
    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    /// Whether the store holds no blobs
    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.blobs.lock().get(key).cloned())
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.blobs.lock().insert(key.to_string(), bytes);
        Ok(())
    }
}

/*!
 * Full lifecycle tests: startup restore, post-write backup cycles, and
 * round-trips through the persistent store across simulated reloads.
 */

use anyhow::Result;
use rusqlite::Connection;
use std::sync::Arc;
use uuid::Uuid;

use sqlkeep::database::{Todo, TodoRepository};
use sqlkeep::persistence::SyncStatus;
use sqlkeep::storage::MemoryBlobStore;

use crate::common;

/// With no persisted backup, the restore sequence yields status -1 and
/// leaves the store untouched; opening still creates a usable database
#[tokio::test]
async fn test_open_withEmptyStore_shouldStartFresh() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let workdir = common::create_workdir(&dir)?;
    let store = Arc::new(MemoryBlobStore::new());
    let lifecycle = common::create_lifecycle(workdir.clone(), &store);

    let _conn = lifecycle.open().await?;

    assert_eq!(lifecycle.last_status(), SyncStatus::NotFound);
    assert_eq!(lifecycle.last_status().code(), -1);
    assert!(store.is_empty());
    assert_eq!(workdir.list_files()?, vec![common::LOGICAL_NAME.to_string()]);
    Ok(())
}

/// Running the restore sequence twice against an empty store is
/// idempotent: still -1, still no writes anywhere
#[tokio::test]
async fn test_open_calledTwice_shouldConsumeStartupTaskOnce() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let workdir = common::create_workdir(&dir)?;
    let store = Arc::new(MemoryBlobStore::new());
    let lifecycle = common::create_lifecycle(workdir.clone(), &store);

    let _first = lifecycle.open().await?;
    let _second = lifecycle.open().await?;

    assert_eq!(lifecycle.last_status(), SyncStatus::NotFound);
    assert!(store.is_empty());
    Ok(())
}

/// Empty store scenario: open, write one record, let the backup cycle
/// finish; the store then holds one blob under the logical filename
#[tokio::test]
async fn test_write_shouldPushBackupToStore() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let workdir = common::create_workdir(&dir)?;
    let store = Arc::new(MemoryBlobStore::new());
    let lifecycle = common::create_lifecycle(workdir.clone(), &store);
    let repository = TodoRepository::new(lifecycle.clone());

    let todo = Todo::new("Buy milk", "Two liters")?;
    repository.register(&todo).await?;
    lifecycle.shutdown().await;

    assert_eq!(lifecycle.last_status(), SyncStatus::Pushed);
    assert_eq!(lifecycle.last_status().code(), 1);
    assert_eq!(store.len(), 1);
    assert!(store.contains(common::LOGICAL_NAME));

    // The pushed snapshot was consumed: only the live file remains
    assert_eq!(workdir.list_files()?, vec![common::LOGICAL_NAME.to_string()]);
    Ok(())
}

/// A write affecting zero rows produces no backup file and no store call
#[tokio::test]
async fn test_emptyWrite_shouldSkipBackupCycle() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let workdir = common::create_workdir(&dir)?;
    let store = Arc::new(MemoryBlobStore::new());
    let lifecycle = common::create_lifecycle(workdir.clone(), &store);
    let repository = TodoRepository::new(lifecycle.clone());

    let ghost = Todo::new("Not registered", "")?;
    let changed = repository.update(&ghost).await?;
    lifecycle.shutdown().await;

    assert!(!changed);
    assert!(store.is_empty());
    assert_eq!(lifecycle.last_status(), SyncStatus::NotFound);
    assert_eq!(workdir.list_files()?, vec![common::LOGICAL_NAME.to_string()]);
    Ok(())
}

/// Round-trip: content committed before a reload is exactly what a fresh
/// orchestrator restores from the persistent store afterwards
#[tokio::test]
async fn test_roundTrip_acrossRestart_shouldRestoreLastWrite() -> Result<()> {
    let store = Arc::new(MemoryBlobStore::new());

    // First session: write two todos, complete one, then drain pushes
    let first_dir = common::create_temp_dir()?;
    let first_work = common::create_workdir(&first_dir)?;
    let first_lifecycle = common::create_lifecycle(first_work, &store);
    let first_repo = TodoRepository::new(first_lifecycle.clone());

    let mut milk = Todo::new("Buy milk", "Two liters")?;
    let bread = Todo::new("Buy bread", "")?;
    first_repo.register(&milk).await?;
    first_repo.register(&bread).await?;
    milk.mark_completed();
    first_repo.update(&milk).await?;
    first_lifecycle.shutdown().await;

    assert_eq!(first_lifecycle.last_status(), SyncStatus::Pushed);

    // Simulated reload: fresh working filesystem, same persistent store
    let second_dir = common::create_temp_dir()?;
    let second_work = common::create_workdir(&second_dir)?;
    let second_lifecycle = common::create_lifecycle(second_work, &store);
    let second_repo = TodoRepository::new(second_lifecycle.clone());

    let restored = second_repo.all().await?;

    assert_eq!(second_lifecycle.last_status(), SyncStatus::Restored);
    assert_eq!(second_lifecycle.last_status().code(), 0);
    assert_eq!(restored.len(), 2);
    assert_eq!(restored[0], milk);
    assert_eq!(restored[1], bread);

    second_lifecycle.shutdown().await;
    Ok(())
}

/// Pre-seeded store scenario: a blob seeded under "todos.sqlite3" is
/// materialized verbatim as the backup file and becomes the live content
#[tokio::test]
async fn test_open_withSeededStore_shouldRestoreSeededContent() -> Result<()> {
    // Build a database file out-of-band and capture its bytes
    let seed_dir = common::create_temp_dir()?;
    let seed_path = seed_dir.path().join("seed.sqlite3");
    let seeded_id = Uuid::new_v4();
    {
        let conn = Connection::open(&seed_path)?;
        conn.execute_batch(
            "CREATE TABLE todos (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                completed INTEGER NOT NULL DEFAULT 0
            );",
        )?;
        conn.execute(
            "INSERT INTO todos (id, title, description, completed) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![seeded_id.to_string(), "Seeded", "From a previous session", true],
        )?;
    }
    let seeded_bytes = std::fs::read(&seed_path)?;

    let dir = common::create_temp_dir()?;
    let workdir = common::create_workdir(&dir)?;
    let store = Arc::new(MemoryBlobStore::with_blobs([(
        common::LOGICAL_NAME.to_string(),
        seeded_bytes.clone(),
    )]));
    let lifecycle = common::create_lifecycle(workdir.clone(), &store);
    let repository = TodoRepository::new(lifecycle.clone());

    let restored = repository.all().await?;

    assert_eq!(lifecycle.last_status(), SyncStatus::Restored);
    // The sync service materialized the blob bytes verbatim
    assert_eq!(workdir.read_file("todos.sqlite3_backup")?, seeded_bytes);
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].id, seeded_id);
    assert_eq!(restored[0].title, "Seeded");
    assert!(restored[0].completed);

    lifecycle.shutdown().await;
    Ok(())
}

/// Repository CRUD round-trips through a live orchestrator
#[tokio::test]
async fn test_repository_crud_shouldRoundTrip() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let workdir = common::create_workdir(&dir)?;
    let store = Arc::new(MemoryBlobStore::new());
    let lifecycle = common::create_lifecycle(workdir, &store);
    let repository = TodoRepository::new(lifecycle.clone());

    let mut todo = Todo::new("Write tests", "For the lifecycle")?;
    repository.register(&todo).await?;

    let fetched = repository.get(todo.id).await?;
    assert_eq!(fetched.as_ref(), Some(&todo));

    todo.mark_completed();
    assert!(repository.update(&todo).await?);
    let completed = repository.get(todo.id).await?;
    assert!(completed.map(|t| t.completed).unwrap_or(false));

    assert!(repository.remove(todo.id).await?);
    assert!(repository.get(todo.id).await?.is_none());
    assert!(repository.all().await?.is_empty());

    lifecycle.shutdown().await;
    Ok(())
}

/// The download link reflects the persisted snapshot after a push and
/// stays empty before any push
#[tokio::test]
async fn test_downloadLink_shouldTrackPersistedSnapshot() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let workdir = common::create_workdir(&dir)?;
    let store = Arc::new(MemoryBlobStore::new());
    let lifecycle = common::create_lifecycle(workdir, &store);
    let repository = TodoRepository::new(lifecycle.clone());

    let _conn = lifecycle.open().await?;
    assert!(lifecycle.download_link().await?.is_empty());

    let todo = Todo::new("Persist me", "")?;
    repository.register(&todo).await?;
    lifecycle.shutdown().await;

    let link = lifecycle.download_link().await?;
    assert!(link.starts_with("data:application/octet-stream;base64,"));
    assert_eq!(store.len(), 1);
    Ok(())
}

/// Consecutive writes each run their own backup cycle; the store ends up
/// with a single blob for the logical name and no stray snapshot files
#[tokio::test]
async fn test_consecutiveWrites_shouldNotCollideOnSnapshots() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let workdir = common::create_workdir(&dir)?;
    let store = Arc::new(MemoryBlobStore::new());
    let lifecycle = common::create_lifecycle(workdir.clone(), &store);
    let repository = TodoRepository::new(lifecycle.clone());

    for i in 0..3 {
        let todo = Todo::new(format!("Task {}", i), "")?;
        repository.register(&todo).await?;
    }
    lifecycle.shutdown().await;

    assert_eq!(lifecycle.last_status(), SyncStatus::Pushed);
    assert_eq!(store.len(), 1);
    assert_eq!(workdir.list_files()?, vec![common::LOGICAL_NAME.to_string()]);
    assert_eq!(repository.all().await?.len(), 3);

    lifecycle.shutdown().await;
    Ok(())
}

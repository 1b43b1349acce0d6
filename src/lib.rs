/*!
 * # sqlkeep - SQLite persistence for sandboxed environments
 *
 * A Rust library that keeps a file-backed SQLite database alive across
 * reloads of a sandboxed execution environment whose working filesystem is
 * ephemeral (wiped on reload), by shuttling consistent snapshots of the live
 * database file to and from a persistent blob store that survives reloads.
 *
 * ## How it works
 *
 * - On startup the lifecycle orchestrator pulls the last persisted snapshot
 *   (if any) out of the blob store into the working filesystem and
 *   materializes it as the live database file through SQLite's online
 *   backup API, so the application resumes exactly where it left off.
 * - After every successful write it takes a fresh, uniquely-named snapshot
 *   of the live file and pushes it back to the blob store in the
 *   background, without blocking the writer.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `persistence`: The restore/backup/swap synchronization subsystem:
 *   - `persistence::lifecycle`: Lifecycle orchestrator gating first use and
 *     triggering backup cycles
 *   - `persistence::swap`: Engine-level consistent file copy
 *   - `persistence::sync`: Moves named files between the working filesystem
 *     and the blob store
 *   - `persistence::registry`: Filename resolution from connection strings
 * - `storage`: Filesystem and blob store collaborators
 * - `database`: Connection handling, schema, entity model, and repository
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod database;
pub mod errors;
pub mod persistence;
pub mod storage;

// Re-export main types for easier usage
pub use app_config::Config;
pub use database::{ManagedConnection, Todo, TodoContext, TodoRepository};
pub use errors::{AppError, StoreError, SwapError};
pub use persistence::{DbLifecycle, FilenameRegistry, StorageSyncService, SwapService, SyncStatus};
pub use storage::{BlobStore, DirectoryBlobStore, MemoryBlobStore, WorkDir};

/*!
 * Restore/backup/swap synchronization subsystem.
 *
 * This module keeps the ephemeral working copy of the database and its
 * persistent backup copy consistent:
 * - `lifecycle`: orchestrates the one-time startup restore, gates first use,
 *   and triggers a backup cycle after every successful write
 * - `swap`: engine-level consistent copy of one database file onto another
 * - `sync`: moves named files between the working filesystem and the
 *   persistent blob store
 * - `registry`: resolves and caches the on-disk filename per handle type
 * - `status`: the status-code contract between sync service and orchestrator
 */

pub mod lifecycle;
pub mod registry;
pub mod status;
pub mod swap;
pub mod sync;

// Re-export main types
pub use lifecycle::DbLifecycle;
pub use registry::FilenameRegistry;
pub use status::SyncStatus;
pub use swap::SwapService;
pub use sync::StorageSyncService;

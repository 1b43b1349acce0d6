/*!
 * Filesystem and blob store collaborators.
 *
 * This module provides the two storage surfaces the synchronization
 * subsystem bridges:
 * - the ephemeral working filesystem holding the live database file
 * - the persistent blob store that survives environment reloads
 */

pub mod store;
pub mod workdir;

// Re-export main types
pub use store::{BlobStore, DirectoryBlobStore, MemoryBlobStore};
pub use workdir::WorkDir;

/*!
 * Atomic swap primitive.
 *
 * Produces a consistent copy of one database file as another through the
 * engine's online backup mechanism, so a copy taken while the source is
 * logically open is never torn. A raw byte copy would not give that
 * guarantee.
 */

use log::debug;
use rusqlite::Connection;
use rusqlite::backup::Backup;
use std::path::Path;
use std::time::Duration;

use crate::errors::SwapError;

/// Pages copied per backup step
const PAGES_PER_STEP: std::ffi::c_int = 64;

/// Pause between backup steps, yielding the source database to writers
const STEP_PAUSE: Duration = Duration::from_millis(5);

/// How long either handle waits on a contended file lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Engine-level consistent copy of one database file onto another.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapService;

impl SwapService {
    /// Create a new swap service
    pub fn new() -> Self {
        Self
    }

    /// Copy the database at `source` onto `dest`, replacing its content.
    ///
    /// Safe to call while `source` is the live, in-use database file. Fails
    /// if either file cannot be opened as a valid database; such failure
    /// propagates to the caller.
    pub async fn swap(
        &self,
        source: impl AsRef<Path>,
        dest: impl AsRef<Path>,
    ) -> Result<(), SwapError> {
        let source = source.as_ref().to_path_buf();
        let dest = dest.as_ref().to_path_buf();

        tokio::task::spawn_blocking(move || Self::swap_blocking(&source, &dest))
            .await
            .map_err(|e| SwapError::TaskFailed(e.to_string()))?
    }

    fn swap_blocking(source: &Path, dest: &Path) -> Result<(), SwapError> {
        debug!("Swapping {:?} onto {:?}", source, dest);

        let src = Connection::open(source).map_err(|e| SwapError::OpenFailed {
            file: source.display().to_string(),
            source: e,
        })?;
        let mut dst = Connection::open(dest).map_err(|e| SwapError::OpenFailed {
            file: dest.display().to_string(),
            source: e,
        })?;
        src.busy_timeout(BUSY_TIMEOUT).map_err(SwapError::BackupFailed)?;
        dst.busy_timeout(BUSY_TIMEOUT).map_err(SwapError::BackupFailed)?;

        {
            let backup = Backup::new(&src, &mut dst).map_err(SwapError::BackupFailed)?;
            backup
                .run_to_completion(PAGES_PER_STEP, STEP_PAUSE, None)
                .map_err(SwapError::BackupFailed)?;
        }

        if let Err((_, e)) = dst.close() {
            return Err(SwapError::CloseFailed(e));
        }
        if let Err((_, e)) = src.close() {
            return Err(SwapError::CloseFailed(e));
        }

        Ok(())
    }
}

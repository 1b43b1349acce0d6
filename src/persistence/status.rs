/*!
 * Sync status codes.
 *
 * The integer contract between the sync service and the lifecycle
 * orchestrator. The orchestrator always reflects the most recently
 * completed sync attempt.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a sync attempt against the persistent blob store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No sync has been attempted yet
    NotRun,
    /// Nothing found to sync, or the attempt failed
    NotFound,
    /// A persisted backup was found and restored into the working filesystem
    Restored,
    /// A local backup was pushed to the persistent store
    Pushed,
}

impl SyncStatus {
    /// The wire-contract integer for this status
    pub fn code(self) -> i32 {
        match self {
            SyncStatus::NotRun => -2,
            SyncStatus::NotFound => -1,
            SyncStatus::Restored => 0,
            SyncStatus::Pushed => 1,
        }
    }

    /// Parse a wire-contract integer back into a status
    pub fn from_code(code: i32) -> anyhow::Result<Self> {
        match code {
            -2 => Ok(SyncStatus::NotRun),
            -1 => Ok(SyncStatus::NotFound),
            0 => Ok(SyncStatus::Restored),
            1 => Ok(SyncStatus::Pushed),
            _ => Err(anyhow::anyhow!("Invalid sync status code: {}", code)),
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::NotRun => write!(f, "not_run"),
            SyncStatus::NotFound => write!(f, "not_found"),
            SyncStatus::Restored => write!(f, "restored"),
            SyncStatus::Pushed => write!(f, "pushed"),
        }
    }
}

impl std::str::FromStr for SyncStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "not_run" => Ok(SyncStatus::NotRun),
            "not_found" => Ok(SyncStatus::NotFound),
            "restored" => Ok(SyncStatus::Restored),
            "pushed" => Ok(SyncStatus::Pushed),
            _ => Err(anyhow::anyhow!("Invalid sync status: {}", s)),
        }
    }
}

/*!
 * Error types for the sqlkeep library.
 *
 * This module contains custom error types for different parts of the
 * subsystem, using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur while swapping one database file onto another
#[derive(Error, Debug)]
pub enum SwapError {
    /// A file could not be opened as a valid database
    #[error("Failed to open {file} as a database: {source}")]
    OpenFailed {
        /// The file that failed to open
        file: String,
        /// The underlying engine error
        source: rusqlite::Error,
    },

    /// The engine-level online backup failed
    #[error("Online backup failed: {0}")]
    BackupFailed(rusqlite::Error),

    /// A database handle could not be closed after the backup
    #[error("Failed to close database after backup: {0}")]
    CloseFailed(rusqlite::Error),

    /// The blocking task running the swap did not complete
    #[error("Swap task failed: {0}")]
    TaskFailed(String),
}

/// Errors that can occur when talking to the persistent blob store
#[derive(Error, Debug)]
pub enum StoreError {
    /// An I/O error while reading or writing a blob
    #[error("Blob store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking task running the store operation did not complete
    #[error("Blob store task failed: {0}")]
    TaskFailed(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the swap primitive
    #[error("Swap error: {0}")]
    Swap(#[from] SwapError),

    /// Error from the persistent blob store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from the database engine
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

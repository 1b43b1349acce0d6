/*!
 * Database context types and schema definitions.
 *
 * A context type stands for one logical database: it carries the schema
 * and serves as the registry key its filename is cached under.
 */

use anyhow::{Context, Result};
use rusqlite::Connection;

/// A logical database handle type.
///
/// The filename registry caches one resolved filename per implementing
/// type, and the lifecycle orchestrator runs `create_schema` on the first
/// successful open.
pub trait DatabaseContext: Send + Sync + 'static {
    /// Initialize the schema on a fresh database. Must be idempotent.
    fn create_schema(conn: &Connection) -> Result<()>;
}

/// Context for the todo database
pub struct TodoContext;

impl DatabaseContext for TodoContext {
    fn create_schema(conn: &Connection) -> Result<()> {
        // journal_mode stays DELETE so the working file remains the single
        // transfer unit between filesystem and blob store
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                completed INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .context("Failed to create todos schema")
    }
}

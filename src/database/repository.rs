/*!
 * Repository layer for todo operations.
 *
 * A thin pass-through over SQL: each operation obtains a managed
 * connection from the lifecycle orchestrator (one unit of work per call),
 * so every successful mutation triggers exactly one backup cycle.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{OptionalExtension, Row, params};
use uuid::Uuid;

use super::models::Todo;
use super::schema::TodoContext;
use crate::persistence::lifecycle::DbLifecycle;

/// Repository for todo records
#[derive(Clone)]
pub struct TodoRepository {
    /// Lifecycle orchestrator the connections come from
    lifecycle: DbLifecycle<TodoContext>,
}

impl TodoRepository {
    /// Create a new repository over the given lifecycle orchestrator
    pub fn new(lifecycle: DbLifecycle<TodoContext>) -> Self {
        Self { lifecycle }
    }

    /// Fetch all todos in insertion order
    pub async fn all(&self) -> Result<Vec<Todo>> {
        let db = self.lifecycle.open().await?;

        db.execute_async(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, title, description, completed FROM todos ORDER BY rowid")?;
            let rows = stmt.query_map([], todo_from_row)?;

            let mut todos = Vec::new();
            for todo in rows {
                todos.push(todo?);
            }
            Ok(todos)
        })
        .await
    }

    /// Fetch a todo by id
    pub async fn get(&self, id: Uuid) -> Result<Option<Todo>> {
        let db = self.lifecycle.open().await?;
        let id = id.to_string();

        db.execute_async(move |conn| {
            let result = conn
                .query_row(
                    "SELECT id, title, description, completed FROM todos WHERE id = ?1",
                    [id],
                    todo_from_row,
                )
                .optional()?;
            Ok(result)
        })
        .await
    }

    /// Register a new todo
    pub async fn register(&self, todo: &Todo) -> Result<()> {
        let db = self.lifecycle.open().await?;
        let todo = todo.clone();

        let rows = db
            .write_async(move |conn| {
                let rows = conn.execute(
                    "INSERT INTO todos (id, title, description, completed) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        todo.id.to_string(),
                        todo.title,
                        todo.description,
                        todo.completed
                    ],
                )?;
                Ok(rows)
            })
            .await?;

        debug!("Registered todo ({} row)", rows);
        Ok(())
    }

    /// Update an existing todo; returns whether a record was changed
    pub async fn update(&self, todo: &Todo) -> Result<bool> {
        let db = self.lifecycle.open().await?;
        let todo = todo.clone();

        let rows = db
            .write_async(move |conn| {
                let rows = conn.execute(
                    "UPDATE todos SET title = ?2, description = ?3, completed = ?4 WHERE id = ?1",
                    params![
                        todo.id.to_string(),
                        todo.title,
                        todo.description,
                        todo.completed
                    ],
                )?;
                Ok(rows)
            })
            .await?;

        Ok(rows > 0)
    }

    /// Remove a todo by id; returns whether a record was deleted
    pub async fn remove(&self, id: Uuid) -> Result<bool> {
        let db = self.lifecycle.open().await?;
        let id = id.to_string();

        let rows = db
            .write_async(move |conn| {
                let rows = conn.execute("DELETE FROM todos WHERE id = ?1", [id])?;
                Ok(rows)
            })
            .await?;

        Ok(rows > 0)
    }
}

/// Map a database row to a todo record
fn todo_from_row(row: &Row<'_>) -> rusqlite::Result<Todo> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Todo {
        id,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
    })
}

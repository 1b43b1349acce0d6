/*!
 * Database layer: connection handling, schema, entity model, and the CRUD
 * repository built on the lifecycle orchestrator.
 */

// Allow dead code - database types are for library consumers
#![allow(dead_code)]

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::ManagedConnection;
pub use models::Todo;
pub use repository::TodoRepository;
pub use schema::{DatabaseContext, TodoContext};

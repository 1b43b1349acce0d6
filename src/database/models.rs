/*!
 * Entity model.
 */

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a todo title
pub const MAX_TITLE_LEN: usize = 100;

/// A single todo record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub id: Uuid,
    /// Short title, non-empty and at most [`MAX_TITLE_LEN`] characters
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Completion flag
    pub completed: bool,
}

impl Todo {
    /// Create a new, uncompleted todo with a fresh id
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            bail!("Todo title must not be empty");
        }
        if title.chars().count() > MAX_TITLE_LEN {
            bail!("Todo title must be at most {} characters", MAX_TITLE_LEN);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            title,
            description: description.into(),
            completed: false,
        })
    }

    /// Mark this todo as completed
    pub fn mark_completed(&mut self) {
        self.completed = true;
    }
}

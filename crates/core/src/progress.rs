//! Progress events emitted by long-running tasks.

use serde::{Deserialize, Serialize};

/// Progress update for a running conversion or download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProgress {
    /// Identifier of the task the update belongs to.
    pub task_id: String,
    /// Progress percentage (0.0 - 100.0).
    pub percent: f32,
    /// Human readable status line.
    pub status: String,
}

impl TaskProgress {
    pub fn new(task_id: impl Into<String>, percent: f32, status: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            percent: percent.clamp(0.0, 100.0),
            status: status.into(),
        }
    }
}

/// Creates a short random task identifier.
pub fn new_task_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..12].to_string()
}

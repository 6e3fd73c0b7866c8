//! Task record as stored under the `tasks` key.
//!
//! # Invariants
//! - Wire field names are `id`, `name`, `completed`, `listId`.
//! - `completed` is reserved; no board operation toggles it.

use serde::{Deserialize, Serialize};

/// Integer task identifier, unique across the flat collection.
pub type TaskId = i64;

/// Integer identifier of one of the configured lists.
pub type ListId = i64;

/// One user-created work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub completed: bool,
    /// List currently holding this task.
    pub list_id: ListId,
}

impl Task {
    /// Creates an open task in `list_id`.
    pub fn new(id: TaskId, list_id: ListId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            completed: false,
            list_id,
        }
    }

    pub fn belongs_to(&self, list_id: ListId) -> bool {
        self.list_id == list_id
    }
}

/// Issues task ids from epoch milliseconds, never repeating one.
///
/// Two tasks created within the same millisecond, or a clock that steps
/// backwards, still get strictly increasing ids. Once `i64::MAX` has been
/// issued the allocator is exhausted and `next_id` returns `None`.
#[derive(Debug, Clone, Default)]
pub struct TaskIdAllocator {
    last_issued: TaskId,
}

impl TaskIdAllocator {
    /// Starts above every id in `existing`.
    pub fn seeded_from<'a>(existing: impl IntoIterator<Item = &'a Task>) -> Self {
        let last_issued = existing.into_iter().map(|task| task.id).max().unwrap_or(0);
        Self { last_issued }
    }

    /// Returns `now_ms`, or the next id above the last one issued.
    ///
    /// Returns `None` without changing state when no larger id exists.
    pub fn next_id(&mut self, now_ms: TaskId) -> Option<TaskId> {
        let id = if now_ms > self.last_issued {
            now_ms
        } else {
            self.last_issued.checked_add(1)?
        };
        self.last_issued = id;
        Some(id)
    }
}

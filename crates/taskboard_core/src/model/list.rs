//! Fixed list configuration and derived per-list views.

use crate::model::task::{ListId, Task};
use serde::Serialize;

/// Static definition of one board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSpec {
    pub id: ListId,
    pub name: &'static str,
}

/// The three columns every board starts with, in display order.
pub const DEFAULT_LISTS: [ListSpec; 3] = [
    ListSpec {
        id: 1,
        name: "Todo",
    },
    ListSpec {
        id: 2,
        name: "In Progress",
    },
    ListSpec {
        id: 3,
        name: "Done",
    },
];

/// One column with its derived task view.
///
/// `tasks` is a filtered copy of the flat collection in insertion order;
/// it is rebuilt on every board mutation and never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct List {
    pub id: ListId,
    pub name: String,
    pub tasks: Vec<Task>,
}

impl List {
    /// Creates an empty view for `spec`.
    pub fn empty(spec: &ListSpec) -> Self {
        Self {
            id: spec.id,
            name: spec.name.to_string(),
            tasks: Vec::new(),
        }
    }

    /// Builds the view for `spec` by filtering `all_tasks` on list id.
    pub fn derive(spec: &ListSpec, all_tasks: &[Task]) -> Self {
        Self {
            id: spec.id,
            name: spec.name.to_string(),
            tasks: all_tasks
                .iter()
                .filter(|task| task.belongs_to(spec.id))
                .cloned()
                .collect(),
        }
    }
}

/// Read-only render model handed to presentation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    pub lists: Vec<List>,
}

impl BoardSnapshot {
    /// Total task count across all lists.
    pub fn task_count(&self) -> usize {
        self.lists.iter().map(|list| list.tasks.len()).sum()
    }
}

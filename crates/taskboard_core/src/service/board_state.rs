//! Board state: flat task collection, derived list views, write-through.
//!
//! # Responsibility
//! - Load the flat collection once and derive one view per configured list.
//! - Apply add / delete / rename / move and mirror each change to storage.
//!
//! # Invariants
//! - The flat collection is authoritative; storage is best-effort.
//! - Every mutation runs: change collection, save, rebuild views.
//! - Delete, rename and move match on task id alone. The list argument each
//!   receives is accepted for call-shape compatibility and ignored.
//! - A task id that matches nothing makes the operation a no-op.

use crate::model::list::{BoardSnapshot, List, ListSpec, DEFAULT_LISTS};
use crate::model::task::{ListId, Task, TaskId, TaskIdAllocator};
use crate::repo::persistent_store::{PersistError, PersistentStore};
use crate::store::KeyValueStore;
use log::{debug, info, warn};
use std::time::{SystemTime, UNIX_EPOCH};

/// Storage key holding the flat task collection.
pub const TASKS_STORAGE_KEY: &str = "tasks";

/// In-memory board backed by a persistent store.
pub struct BoardState<S: KeyValueStore> {
    store: PersistentStore<S>,
    specs: &'static [ListSpec],
    tasks: Vec<Task>,
    lists: Vec<List>,
    ids: TaskIdAllocator,
    last_persist_error: Option<PersistError>,
}

impl<S: KeyValueStore> BoardState<S> {
    /// Loads the board from `backend` using the default three lists.
    pub fn load(backend: S) -> Self {
        Self::load_with_lists(backend, &DEFAULT_LISTS)
    }

    /// Loads the board with a custom fixed list configuration.
    pub fn load_with_lists(backend: S, specs: &'static [ListSpec]) -> Self {
        let store = PersistentStore::new(backend);
        let tasks: Vec<Task> = store.load(TASKS_STORAGE_KEY, Vec::new());
        let ids = TaskIdAllocator::seeded_from(&tasks);

        let mut board = Self {
            store,
            specs,
            tasks,
            lists: Vec::new(),
            ids,
            last_persist_error: None,
        };

        if board.tasks.is_empty() {
            board.lists = specs.iter().map(List::empty).collect();
        } else {
            board.refresh_views();
        }

        info!(
            "event=board_load module=service status=ok tasks={} lists={}",
            board.tasks.len(),
            board.lists.len()
        );
        board
    }

    /// Derived per-list views in configuration order.
    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    pub fn list(&self, list_id: ListId) -> Option<&List> {
        self.lists.iter().find(|list| list.id == list_id)
    }

    /// The flat collection in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// Owned render model for presentation code.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            lists: self.lists.clone(),
        }
    }

    /// Lists a task in `current_list_id` may be moved to.
    pub fn transfer_targets(&self, current_list_id: ListId) -> Vec<&ListSpec> {
        self.specs
            .iter()
            .filter(|spec| spec.id != current_list_id)
            .collect()
    }

    pub fn has_list(&self, list_id: ListId) -> bool {
        self.specs.iter().any(|spec| spec.id == list_id)
    }

    /// Most recent failed save, cleared by the next successful one.
    pub fn last_persist_error(&self) -> Option<&PersistError> {
        self.last_persist_error.as_ref()
    }

    pub fn store(&self) -> &PersistentStore<S> {
        &self.store
    }

    pub fn into_store(self) -> PersistentStore<S> {
        self.store
    }

    /// Appends a new open task to `list_id` and returns its id.
    ///
    /// The name is stored as given; callers trim and reject empty input.
    pub fn add_task(&mut self, list_id: ListId, name: impl Into<String>) -> TaskId {
        let id = self.allocate_id();
        self.tasks.push(Task::new(id, list_id, name));
        info!("event=task_add module=service status=ok task_id={id} list_id={list_id}");
        self.commit();
        id
    }

    /// Removes the task with `task_id`. Returns whether one was removed.
    pub fn delete_task(&mut self, _list_id: ListId, task_id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != task_id);
        let removed = self.tasks.len() != before;
        log_outcome("task_delete", task_id, removed);
        self.commit();
        removed
    }

    /// Replaces the name of the task with `task_id`.
    pub fn update_task(
        &mut self,
        _list_id: ListId,
        task_id: TaskId,
        new_name: impl Into<String>,
    ) -> bool {
        let new_name = new_name.into();
        let updated = match self.tasks.iter_mut().find(|task| task.id == task_id) {
            Some(task) => {
                task.name = new_name;
                true
            }
            None => false,
        };
        log_outcome("task_update", task_id, updated);
        self.commit();
        updated
    }

    /// Reassigns the task with `task_id` to `target_list_id`.
    ///
    /// `source_list_id` is not checked against the task's current list.
    pub fn transfer_task(
        &mut self,
        source_list_id: ListId,
        target_list_id: ListId,
        task_id: TaskId,
    ) -> bool {
        let moved = match self.tasks.iter_mut().find(|task| task.id == task_id) {
            Some(task) => {
                if task.list_id != source_list_id {
                    debug!(
                        "event=task_transfer module=service status=source_mismatch task_id={task_id} source_list_id={source_list_id} actual_list_id={}",
                        task.list_id
                    );
                }
                task.list_id = target_list_id;
                true
            }
            None => false,
        };
        if moved && !self.has_list(target_list_id) {
            warn!(
                "event=task_transfer module=service status=unknown_target task_id={task_id} target_list_id={target_list_id}"
            );
        }
        log_outcome("task_transfer", task_id, moved);
        self.commit();
        moved
    }

    fn allocate_id(&mut self) -> TaskId {
        if let Some(id) = self.ids.next_id(now_epoch_ms()) {
            return id;
        }
        let mut candidate: TaskId = 1;
        while self.tasks.iter().any(|task| task.id == candidate) {
            candidate += 1;
        }
        warn!(
            "event=task_add module=service status=id_space_exhausted fallback_task_id={candidate}"
        );
        candidate
    }

    fn commit(&mut self) {
        match self.store.save(TASKS_STORAGE_KEY, &self.tasks) {
            Ok(()) => self.last_persist_error = None,
            Err(err) => self.last_persist_error = Some(err),
        }
        self.refresh_views();
    }

    fn refresh_views(&mut self) {
        self.lists = self
            .specs
            .iter()
            .map(|spec| List::derive(spec, &self.tasks))
            .collect();
    }
}

fn log_outcome(event: &str, task_id: TaskId, matched: bool) {
    if matched {
        info!("event={event} module=service status=ok task_id={task_id}");
    } else {
        debug!("event={event} module=service status=noop task_id={task_id}");
    }
}

fn now_epoch_ms() -> TaskId {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

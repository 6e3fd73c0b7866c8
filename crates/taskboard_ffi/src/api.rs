//! FFI board API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the board operations and a render snapshot to Dart via FRB.
//! - Validate user text before it reaches the core.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One board per process, loaded lazily from the entry database and kept
//!   in memory; storage mirrors it on every mutation.
//! - Every response carries the lists as they stand after the call.

use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use taskboard_core::db::open_db;
use taskboard_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    normalize_task_name, ping as ping_inner, BoardState, List, SqliteKeyValueStore, Task,
};

const BOARD_DB_FILE_NAME: &str = "taskboard_entry.sqlite3";
static BOARD_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static BOARD: Mutex<Option<BoardState<SqliteKeyValueStore>>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
/// Repeating the same `level + log_dir` is accepted.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One task as rendered in a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTaskItem {
    pub id: i64,
    pub name: String,
    pub completed: bool,
    pub list_id: i64,
}

/// One column with its ordered tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardListItem {
    pub id: i64,
    pub name: String,
    pub tasks: Vec<BoardTaskItem>,
    /// Ids of the lists a task here may be moved to.
    pub transfer_targets: Vec<i64>,
}

/// Response envelope for every board call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardResponse {
    /// Whether the call was accepted.
    pub ok: bool,
    /// Id of the created task for `board_add_task`.
    pub task_id: Option<i64>,
    /// Whether the referenced task existed (delete/update/transfer).
    pub matched: bool,
    /// Human-readable diagnostics. Mentions unsaved changes when the
    /// storage write failed.
    pub message: String,
    /// Lists after the call; empty when the board could not be opened.
    pub lists: Vec<BoardListItem>,
}

impl BoardResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            matched: false,
            message: message.into(),
            lists: Vec::new(),
        }
    }
}

/// Returns the current lists without changing anything.
#[flutter_rust_bridge::frb(sync)]
pub fn board_snapshot() -> BoardResponse {
    with_board("board_snapshot", |_| Ok((None, true, "Board loaded.")))
}

/// Adds a task named `name` (trimmed) to `list_id`.
///
/// Rejects blank names and unknown lists without touching the board.
#[flutter_rust_bridge::frb(sync)]
pub fn board_add_task(list_id: i64, name: String) -> BoardResponse {
    let Some(name) = normalize_task_name(&name) else {
        return BoardResponse::failure("board_add_task failed: task name cannot be empty");
    };
    with_board("board_add_task", |board| {
        if !board.has_list(list_id) {
            return Err(format!("unknown list {list_id}"));
        }
        Ok((Some(board.add_task(list_id, name)), true, "Task added."))
    })
}

/// Renames task `task_id` to `name` (trimmed).
#[flutter_rust_bridge::frb(sync)]
pub fn board_update_task(list_id: i64, task_id: i64, name: String) -> BoardResponse {
    let Some(name) = normalize_task_name(&name) else {
        return BoardResponse::failure("board_update_task failed: task name cannot be empty");
    };
    with_board("board_update_task", |board| {
        let matched = board.update_task(list_id, task_id, name);
        Ok((None, matched, outcome_message(matched, "Task renamed.")))
    })
}

/// Deletes task `task_id`. Unknown ids succeed with `matched = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_task(list_id: i64, task_id: i64) -> BoardResponse {
    with_board("board_delete_task", |board| {
        let matched = board.delete_task(list_id, task_id);
        Ok((None, matched, outcome_message(matched, "Task deleted.")))
    })
}

/// Moves task `task_id` into `target_list_id`.
///
/// The target must be one of the task's `transfer_targets`; anything else
/// is rejected and the task stays put. Unknown task ids succeed with
/// `matched = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_transfer_task(
    source_list_id: i64,
    target_list_id: i64,
    task_id: i64,
) -> BoardResponse {
    with_board("board_transfer_task", |board| {
        if let Some(current) = board.task(task_id).map(|task| task.list_id) {
            let allowed = board
                .transfer_targets(current)
                .iter()
                .any(|spec| spec.id == target_list_id);
            if !allowed {
                return Err(format!(
                    "task {task_id} cannot move from list {current} to list {target_list_id}"
                ));
            }
        }
        let matched = board.transfer_task(source_list_id, target_list_id, task_id);
        Ok((None, matched, outcome_message(matched, "Task moved.")))
    })
}

fn outcome_message(matched: bool, done: &'static str) -> &'static str {
    if matched {
        done
    } else {
        "No such task; nothing changed."
    }
}

fn with_board(
    operation: &str,
    f: impl FnOnce(
        &mut BoardState<SqliteKeyValueStore>,
    ) -> Result<(Option<i64>, bool, &'static str), String>,
) -> BoardResponse {
    let mut guard = match BOARD.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("event=ffi_board module=ffi status=recovered_poisoned_lock op={operation}");
            poisoned.into_inner()
        }
    };

    if guard.is_none() {
        match open_board() {
            Ok(board) => *guard = Some(board),
            Err(err) => return BoardResponse::failure(format!("{operation} failed: {err}")),
        }
    }
    let Some(board) = guard.as_mut() else {
        return BoardResponse::failure(format!("{operation} failed: board unavailable"));
    };

    let (task_id, matched, message) = match f(board) {
        Ok(outcome) => outcome,
        Err(reason) => {
            warn!("event=ffi_board module=ffi status=rejected op={operation}");
            return BoardResponse::failure(format!("{operation} failed: {reason}"));
        }
    };
    let board = &*board;
    let message = match board.last_persist_error() {
        Some(err) => format!("{message} Change is not saved: {err}"),
        None => message.to_string(),
    };

    BoardResponse {
        ok: true,
        task_id,
        matched,
        message,
        lists: board
            .lists()
            .iter()
            .map(|list| to_list_item(board, list))
            .collect(),
    }
}

fn open_board() -> Result<BoardState<SqliteKeyValueStore>, String> {
    let db_path = resolve_board_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("board DB open failed: {err}"))?;
    let backend =
        SqliteKeyValueStore::try_new(conn).map_err(|err| format!("board store init failed: {err}"))?;
    Ok(BoardState::load(backend))
}

fn resolve_board_db_path() -> PathBuf {
    BOARD_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("TASKBOARD_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(BOARD_DB_FILE_NAME)
        })
        .clone()
}

fn to_list_item(board: &BoardState<SqliteKeyValueStore>, list: &List) -> BoardListItem {
    BoardListItem {
        id: list.id,
        name: list.name.clone(),
        tasks: list.tasks.iter().map(to_task_item).collect(),
        transfer_targets: board
            .transfer_targets(list.id)
            .iter()
            .map(|spec| spec.id)
            .collect(),
    }
}

fn to_task_item(task: &Task) -> BoardTaskItem {
    BoardTaskItem {
        id: task.id,
        name: task.name.clone(),
        completed: task.completed,
        list_id: task.list_id,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        board_add_task, board_delete_task, board_snapshot, board_transfer_task,
        board_update_task, core_version, init_logging, ping, resolve_board_db_path,
        BoardResponse,
    };
    use std::time::{SystemTime, UNIX_EPOCH};
    use taskboard_core::db::open_db;

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn snapshot_lists_three_columns_with_move_targets() {
        let response = board_snapshot();
        assert!(response.ok, "{}", response.message);

        let names: Vec<_> = response.lists.iter().map(|list| list.name.as_str()).collect();
        assert_eq!(names, vec!["Todo", "In Progress", "Done"]);
        assert_eq!(response.lists[0].transfer_targets, vec![2, 3]);
    }

    #[test]
    fn blank_names_are_rejected_before_reaching_the_board() {
        let response = board_add_task(1, "   ".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("empty"));

        let response = board_update_task(1, 1, String::new());
        assert!(!response.ok);
    }

    #[test]
    fn add_to_unknown_list_is_rejected() {
        let token = unique_token("ffi-unknown-list");
        let response = board_add_task(99, token.clone());
        assert!(!response.ok);
        assert_eq!(response.task_id, None);
        assert!(response.message.contains("unknown list 99"));

        let snapshot = board_snapshot();
        assert!(snapshot
            .lists
            .iter()
            .flat_map(|list| list.tasks.iter())
            .all(|task| task.name != token));
    }

    #[test]
    fn transfer_outside_move_targets_is_rejected() {
        let token = unique_token("ffi-bad-move");
        let added = board_add_task(1, token.clone());
        let task_id = added.task_id.expect("add should return task id");

        let to_unknown = board_transfer_task(1, 99, task_id);
        assert!(!to_unknown.ok);
        assert!(to_unknown.message.contains("cannot move"));

        let to_same = board_transfer_task(1, 1, task_id);
        assert!(!to_same.ok);

        let snapshot = board_snapshot();
        assert_eq!(find_task(&snapshot, task_id), Some((1, token)));

        let missing = board_transfer_task(1, 2, task_id + 1_000_000_000);
        assert!(missing.ok);
        assert!(!missing.matched);

        board_delete_task(1, task_id);
    }

    #[test]
    fn add_move_rename_delete_round_trip() {
        let token = unique_token("ffi-board");

        let added = board_add_task(1, format!("  {token}  "));
        assert!(added.ok, "{}", added.message);
        let task_id = added.task_id.expect("add should return task id");
        assert_eq!(find_task(&added, task_id), Some((1, token.clone())));

        let moved = board_transfer_task(1, 3, task_id);
        assert!(moved.matched);
        assert_eq!(find_task(&moved, task_id), Some((3, token.clone())));

        let renamed = board_update_task(3, task_id, format!("{token} v2"));
        assert!(renamed.matched);
        assert_eq!(find_task(&renamed, task_id), Some((3, format!("{token} v2"))));

        let deleted = board_delete_task(3, task_id);
        assert!(deleted.matched);
        assert_eq!(find_task(&deleted, task_id), None);

        let again = board_delete_task(3, task_id);
        assert!(again.ok);
        assert!(!again.matched);
    }

    #[test]
    fn added_task_is_mirrored_to_the_database() {
        let token = unique_token("ffi-persist");
        let added = board_add_task(2, token.clone());
        let task_id = added.task_id.expect("add should return task id");

        let conn = open_db(resolve_board_db_path()).expect("open db");
        let raw: String = conn
            .query_row(
                "SELECT value FROM kv_items WHERE key = 'tasks';",
                [],
                |row| row.get(0),
            )
            .expect("tasks row");
        assert!(raw.contains(&token));
        assert!(raw.contains(&format!("\"id\":{task_id}")));

        board_delete_task(2, task_id);
    }

    fn find_task(response: &BoardResponse, task_id: i64) -> Option<(i64, String)> {
        response.lists.iter().find_map(|list| {
            list.tasks
                .iter()
                .find(|task| task.id == task_id)
                .map(|task| (list.id, task.name.clone()))
        })
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}

use std::collections::HashSet;
use taskboard_core::db::open_db_in_memory;
use taskboard_core::{
    BoardState, KeyValueStore, MemoryKeyValueStore, PersistError, SqliteKeyValueStore,
    StoreError, Task, TASKS_STORAGE_KEY,
};

#[test]
fn walkthrough_add_move_rename_delete() {
    let mut board = BoardState::load(MemoryKeyValueStore::new());

    let id = board.add_task(1, "write draft");
    assert_eq!(view_names(&board, 1), vec!["write draft"]);
    assert_eq!(board.list(1).unwrap().tasks[0].list_id, 1);
    assert!(board.list(2).unwrap().tasks.is_empty());
    assert!(board.list(3).unwrap().tasks.is_empty());

    assert!(board.transfer_task(1, 2, id));
    assert!(board.list(1).unwrap().tasks.is_empty());
    assert_eq!(board.list(2).unwrap().tasks[0].id, id);
    assert_eq!(board.list(2).unwrap().tasks[0].list_id, 2);

    assert!(board.update_task(2, id, "write draft v2"));
    let renamed = &board.list(2).unwrap().tasks[0];
    assert_eq!(renamed.id, id);
    assert_eq!(renamed.name, "write draft v2");

    assert!(board.delete_task(2, id));
    assert!(board.lists().iter().all(|list| list.tasks.is_empty()));
    assert_eq!(stored_tasks(&board), Some(Vec::new()));
}

#[test]
fn every_add_creates_one_task_with_unique_id_in_its_list_only() {
    let mut board = BoardState::load(MemoryKeyValueStore::new());

    let mut created = Vec::new();
    for round in 0..30_i64 {
        let list_id = round % 3 + 1;
        created.push((board.add_task(list_id, format!("task {round}")), list_id));
    }

    assert_eq!(board.tasks().len(), created.len());
    let unique: HashSet<_> = created.iter().map(|(id, _)| *id).collect();
    assert_eq!(unique.len(), created.len());

    for (id, list_id) in &created {
        for list in board.lists() {
            let hits = list.tasks.iter().filter(|task| task.id == *id).count();
            let expected = usize::from(list.id == *list_id);
            assert_eq!(hits, expected, "task {id} in list {}", list.id);
        }
    }
}

#[test]
fn views_keep_insertion_order() {
    let mut board = BoardState::load(MemoryKeyValueStore::new());
    board.add_task(1, "first");
    board.add_task(2, "elsewhere");
    board.add_task(1, "second");
    board.add_task(1, "third");

    assert_eq!(view_names(&board, 1), vec!["first", "second", "third"]);
}

#[test]
fn operations_on_deleted_task_are_noops() {
    let mut board = BoardState::load(MemoryKeyValueStore::new());
    let keep = board.add_task(1, "keep");
    let gone = board.add_task(1, "gone");

    assert!(board.delete_task(1, gone));
    let before = board.tasks().to_vec();

    assert!(!board.delete_task(1, gone));
    assert!(!board.update_task(1, gone, "revived"));
    assert!(!board.transfer_task(1, 3, gone));

    assert_eq!(board.tasks(), before.as_slice());
    assert_eq!(board.task(keep).unwrap().name, "keep");
    assert!(board.last_persist_error().is_none());
}

#[test]
fn list_argument_is_ignored_when_matching_tasks() {
    let mut board = BoardState::load(MemoryKeyValueStore::new());
    let moving = board.add_task(1, "moving");
    let bystander = board.add_task(1, "bystander");
    let other = board.add_task(3, "other");

    assert!(board.transfer_task(3, 2, moving));
    assert_eq!(board.task(moving).unwrap().list_id, 2);
    assert_eq!(board.task(bystander).unwrap().list_id, 1);
    assert_eq!(board.task(other).unwrap().list_id, 3);

    assert!(board.update_task(3, moving, "renamed anyway"));
    assert_eq!(board.task(moving).unwrap().name, "renamed anyway");

    assert!(board.delete_task(1, moving));
    assert!(board.task(moving).is_none());
    assert_eq!(board.tasks().len(), 2);
}

#[test]
fn core_stores_names_without_validation() {
    let mut board = BoardState::load(MemoryKeyValueStore::new());
    let id = board.add_task(1, "");
    assert_eq!(board.task(id).unwrap().name, "");
}

#[test]
fn reload_restores_tasks_and_views() {
    let mut board = BoardState::load(MemoryKeyValueStore::new());
    let a = board.add_task(1, "a");
    let b = board.add_task(3, "b");
    board.transfer_task(1, 2, a);
    let saved = board.tasks().to_vec();

    let backend = board.into_store().into_backend();
    let mut reloaded = BoardState::load(backend);

    assert_eq!(reloaded.tasks(), saved.as_slice());
    assert_eq!(reloaded.list(2).unwrap().tasks[0].id, a);
    assert_eq!(reloaded.list(3).unwrap().tasks[0].id, b);

    let c = reloaded.add_task(1, "c");
    assert!(c > a.max(b));
}

#[test]
fn reload_from_sqlite_round_trips_field_for_field() {
    let conn = open_db_in_memory().unwrap();
    let mut board = BoardState::load(SqliteKeyValueStore::try_new(conn).unwrap());
    let id = board.add_task(2, "persist me");
    board.update_task(2, id, "persisted");
    board.add_task(3, "also persisted");
    let saved = board.tasks().to_vec();

    let conn = board.into_store().into_backend().into_connection();
    let reloaded = BoardState::load(SqliteKeyValueStore::try_new(conn).unwrap());
    assert_eq!(reloaded.tasks(), saved.as_slice());
}

#[test]
fn corrupt_or_misshapen_storage_loads_as_empty_board() {
    for raw in ["{not json", "null", r#"{"id":1}"#, r#"[{"id":1,"name":"x"}]"#] {
        let mut backend = MemoryKeyValueStore::new();
        backend.set_item(TASKS_STORAGE_KEY, raw).unwrap();

        let board = BoardState::load(backend);
        assert!(board.tasks().is_empty(), "payload {raw:?}");
        assert_eq!(board.lists().len(), 3);
    }
}

#[test]
fn failed_save_keeps_memory_authoritative_and_recovers() {
    let mut backend = MemoryKeyValueStore::new();
    backend.set_quota(Some(4));
    let mut board = BoardState::load(backend);

    let id = board.add_task(1, "too big to store");
    assert_eq!(board.list(1).unwrap().tasks[0].id, id);
    assert!(matches!(
        board.last_persist_error(),
        Some(PersistError::Store(StoreError::QuotaExceeded { .. }))
    ));
    assert_eq!(stored_tasks(&board), None);

    let mut backend = board.into_store().into_backend();
    backend.set_quota(None);
    assert!(BoardState::load(backend.clone()).tasks().is_empty());

    let mut board = BoardState::load(backend);
    let first = board.add_task(1, "first");
    let second = board.add_task(2, "second");
    board.delete_task(1, first);
    assert!(board.last_persist_error().is_none());

    let stored = stored_tasks(&board).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, second);
}

fn view_names<S: KeyValueStore>(board: &BoardState<S>, list_id: i64) -> Vec<String> {
    board
        .list(list_id)
        .unwrap()
        .tasks
        .iter()
        .map(|task| task.name.clone())
        .collect()
}

fn stored_tasks<S: KeyValueStore>(board: &BoardState<S>) -> Option<Vec<Task>> {
    board
        .store()
        .backend()
        .get_item(TASKS_STORAGE_KEY)
        .unwrap()
        .map(|raw| serde_json::from_str(&raw).unwrap())
}

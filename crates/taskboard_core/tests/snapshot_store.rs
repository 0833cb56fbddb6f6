use chrono::NaiveDate;
use taskboard_core::db::{open_db, open_db_in_memory};
use taskboard_core::{
    add_task, decode_board, default_columns, encode_board, Board, CodecError, ColumnId, ColumnSpec,
    FileSnapshotStore, Priority, SnapshotStore, SqliteSnapshotStore, StoreError, TaskDraft,
    TaskId, DEFAULT_SNAPSHOT_KEY,
};

fn board_with_mixed_dates() -> Board {
    let seed = Board::seed();
    add_task(
        &seed,
        TaskDraft::new("No deadline", Priority::Low).described("line one\nline \"two\""),
    )
    .into_board(&seed)
}

#[test]
fn sqlite_store_roundtrips_board() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteSnapshotStore::try_new(&conn, DEFAULT_SNAPSHOT_KEY).unwrap();
    let board = board_with_mixed_dates();

    store.save(&board).unwrap();
    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded, board);

    let (_, _, dated) = loaded.find_task(&TaskId::new("task-1")).unwrap();
    assert_eq!(dated.due_date, NaiveDate::from_ymd_opt(2025, 2, 15));
    let undated = &loaded.intake_column().tasks()[0];
    assert_eq!(undated.due_date, None);
}

#[test]
fn sqlite_store_returns_none_before_first_save() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteSnapshotStore::try_new(&conn, "fresh").unwrap();
    assert!(store.load().unwrap().is_none());
}

#[test]
fn sqlite_store_overwrites_previous_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteSnapshotStore::try_new(&conn, DEFAULT_SNAPSHOT_KEY).unwrap();
    let first = Board::seed();
    let second = Board::empty(&default_columns()).unwrap();

    store.save(&first).unwrap();
    store.save(&second).unwrap();
    assert_eq!(store.load().unwrap().unwrap(), second);

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM board_snapshots;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn sqlite_store_keys_are_independent() {
    let conn = open_db_in_memory().unwrap();
    let alpha = SqliteSnapshotStore::try_new(&conn, "alpha").unwrap();
    let beta = SqliteSnapshotStore::try_new(&conn, "beta").unwrap();

    alpha.save(&Board::seed()).unwrap();
    assert!(beta.load().unwrap().is_none());
    assert!(alpha.clear().unwrap());
    assert!(alpha.load().unwrap().is_none());
}

#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");
    let board = board_with_mixed_dates();

    {
        let conn = open_db(&path).unwrap();
        let store = SqliteSnapshotStore::try_new(&conn, DEFAULT_SNAPSHOT_KEY).unwrap();
        store.save(&board).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteSnapshotStore::try_new(&conn, DEFAULT_SNAPSHOT_KEY).unwrap();
    assert_eq!(store.load().unwrap().unwrap(), board);
}

#[test]
fn sqlite_store_requires_migrated_connection() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let err = SqliteSnapshotStore::try_new(&conn, DEFAULT_SNAPSHOT_KEY)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        StoreError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));

    let conn = open_db_in_memory().unwrap();
    assert!(matches!(
        SqliteSnapshotStore::try_new(&conn, " ").err().unwrap(),
        StoreError::BlankKey
    ));
}

#[test]
fn sqlite_store_reports_malformed_snapshot() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO board_snapshots (snapshot_key, payload) VALUES (?1, ?2);",
        [DEFAULT_SNAPSHOT_KEY, "{not json"],
    )
    .unwrap();

    let store = SqliteSnapshotStore::try_new(&conn, DEFAULT_SNAPSHOT_KEY).unwrap();
    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::Codec(CodecError::Json(_))));
}

#[test]
fn sqlite_store_enforces_layout() {
    let conn = open_db_in_memory().unwrap();
    let layout = vec![ColumnSpec::new("backlog", "Backlog")];
    SqliteSnapshotStore::try_new(&conn, DEFAULT_SNAPSHOT_KEY)
        .unwrap()
        .save(&Board::seed())
        .unwrap();

    let store = SqliteSnapshotStore::try_new(&conn, DEFAULT_SNAPSHOT_KEY)
        .unwrap()
        .with_layout(layout);
    let err = store.load().unwrap_err();
    assert!(matches!(
        err,
        StoreError::Codec(CodecError::LayoutMismatch { .. })
    ));
}

#[test]
fn file_store_roundtrips_and_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("board.json");
    let store = FileSnapshotStore::new(&path).with_layout(default_columns());
    assert!(store.load().unwrap().is_none());

    let board = board_with_mixed_dates();
    store.save(&board).unwrap();
    store.save(&board).unwrap();
    assert_eq!(store.load().unwrap().unwrap(), board);

    let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("board.json")]);
}

#[test]
fn file_store_reports_corrupt_file_and_keeps_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");
    std::fs::write(&path, "[]").unwrap();

    let store = FileSnapshotStore::new(&path);
    assert!(matches!(store.load().unwrap_err(), StoreError::Codec(_)));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
}

#[test]
fn file_store_save_failure_keeps_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");
    let store = FileSnapshotStore::new(&path);
    store.save(&Board::seed()).unwrap();

    // A directory occupying the target path makes the final rename fail.
    let blocked = FileSnapshotStore::new(dir.path());
    assert!(matches!(
        blocked.save(&Board::seed()).unwrap_err(),
        StoreError::Io { .. }
    ));
    assert_eq!(store.load().unwrap().unwrap(), Board::seed());
}

#[test]
fn snapshot_uses_wire_field_names() {
    let payload = encode_board(&Board::seed()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&payload).unwrap();

    let todo = &json["todo"];
    assert_eq!(todo["id"], "todo");
    assert_eq!(todo["title"], "To Do");
    let first = &todo["tasks"][0];
    assert_eq!(first["id"], "task-1");
    assert_eq!(first["content"], "Create project structure");
    assert_eq!(first["priority"], "high");
    assert_eq!(first["dueDate"], "2025-02-15");
    assert_eq!(
        first["description"],
        "Set up the initial project structure and dependencies"
    );
    assert_eq!(json["inProgress"]["title"], "In Progress");
}

#[test]
fn snapshot_encodes_missing_date_as_null() {
    let board = board_with_mixed_dates();
    let json: serde_json::Value = serde_json::from_str(&encode_board(&board).unwrap()).unwrap();
    assert!(json["todo"]["tasks"][0]["dueDate"].is_null());
}

#[test]
fn decode_accepts_timestamp_dates_and_missing_description() {
    let payload = r#"{
        "todo": {"id": "todo", "title": "To Do", "tasks": [
            {"id": "task-9", "content": "Legacy", "priority": "medium",
             "dueDate": "2025-02-20T00:00:00.000Z"}
        ]},
        "done": {"id": "done", "title": "Done", "tasks": []}
    }"#;

    let board = decode_board(payload).unwrap();
    let ids: Vec<&str> = board.column_ids().map(ColumnId::as_str).collect();
    assert_eq!(ids, ["todo", "done"]);
    let (_, _, task) = board.find_task(&TaskId::new("task-9")).unwrap();
    assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 2, 20));
    assert!(task.description.is_empty());
}

#[test]
fn decode_rejects_schema_violations() {
    let bad_priority = r#"{"todo": {"id": "todo", "title": "To Do", "tasks": [
        {"id": "a", "content": "x", "priority": "urgent", "dueDate": null, "description": ""}]}}"#;
    assert!(matches!(
        decode_board(bad_priority).unwrap_err(),
        CodecError::Json(_)
    ));

    let bad_date = r#"{"todo": {"id": "todo", "title": "To Do", "tasks": [
        {"id": "a", "content": "x", "priority": "low", "dueDate": "soon", "description": ""}]}}"#;
    assert!(matches!(decode_board(bad_date).unwrap_err(), CodecError::Json(_)));

    let duplicate = r#"{
        "todo": {"id": "todo", "title": "To Do", "tasks": [
            {"id": "a", "content": "x", "priority": "low", "dueDate": null, "description": ""}]},
        "done": {"id": "done", "title": "Done", "tasks": [
            {"id": "a", "content": "y", "priority": "low", "dueDate": null, "description": ""}]}
    }"#;
    assert!(matches!(
        decode_board(duplicate).unwrap_err(),
        CodecError::Board(_)
    ));

    assert!(matches!(decode_board("{}").unwrap_err(), CodecError::Board(_)));
}

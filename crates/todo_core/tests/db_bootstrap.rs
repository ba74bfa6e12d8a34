use rusqlite::Connection;
use todo_core::db::migrations::latest_version;
use todo_core::db::{open_in_memory, open_snapshot, DbError};
use todo_core::{CreateTodoRequest, SnapshotLocation, StorageHandle, TodoService};

#[test]
fn open_in_memory_applies_all_migrations() {
    let conn = open_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "todos");
}

#[test]
fn missing_snapshot_file_opens_empty_store_without_creating_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.db");

    let conn = open_snapshot(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_eq!(row_count(&conn), 0);
    assert!(!path.exists());
}

#[test]
fn loading_same_snapshot_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.db");
    write_snapshot_with_rows(&path, &["first", "second"]);

    let first = open_snapshot(&path).unwrap();
    assert_eq!(row_count(&first), 2);
    drop(first);

    let second = open_snapshot(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    assert_eq!(row_count(&second), 2);
}

#[test]
fn snapshot_with_newer_schema_version_fails_initialization() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let handle = StorageHandle::new(SnapshotLocation::File(path));
    let err = handle.acquire().unwrap_err();
    match err.0 {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!handle.is_initialized());
}

#[test]
fn current_version_snapshot_without_todos_table_gets_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE other (x); PRAGMA user_version = {};",
        latest_version()
    ))
    .unwrap();
    drop(conn);

    let loaded = open_snapshot(&path).unwrap();
    assert_table_exists(&loaded, "todos");
    assert_table_exists(&loaded, "other");
    drop(loaded);

    let store = StorageHandle::new(SnapshotLocation::File(path));
    let service = TodoService::new(&store);
    let created = service.create(&CreateTodoRequest::titled("one")).unwrap();
    assert_eq!(service.get(created.id).unwrap(), created);
}

#[test]
fn snapshot_that_is_not_a_database_fails_initialization() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.db");
    std::fs::write(&path, vec![b'x'; 4096]).unwrap();

    let handle = StorageHandle::new(SnapshotLocation::File(path.clone()));
    let err = handle.session().err().expect("garbage snapshot must not load");
    assert!(err.to_string().starts_with("database initialization failed"));

    // The unreadable file is left as-is.
    assert_eq!(std::fs::read(&path).unwrap(), vec![b'x'; 4096]);
}

#[test]
fn ephemeral_marker_selects_memory_only_store() {
    let location = SnapshotLocation::parse(":memory:");
    assert!(location.is_ephemeral());

    let handle = StorageHandle::new(location);
    let session = handle.session().unwrap();
    assert_table_exists(session.conn(), "todos");
    session.persist().unwrap();
    drop(session);

    assert!(!std::path::Path::new(":memory:").exists());
}

fn write_snapshot_with_rows(path: &std::path::Path, titles: &[&str]) {
    let conn = open_in_memory().unwrap();
    for title in titles {
        conn.execute("INSERT INTO todos (title) VALUES (?1);", [title])
            .unwrap();
    }
    let image = conn.serialize(rusqlite::DatabaseName::Main).unwrap();
    let bytes: &[u8] = &image;
    std::fs::write(path, bytes).unwrap();
}

fn row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM todos;", [], |row| row.get(0))
        .unwrap()
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table `{table_name}` should exist");
}

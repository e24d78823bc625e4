use forum_core::db::migrations::{apply_migrations, latest_version};
use forum_core::db::{ensure_current, open_db, open_db_in_memory, DbError, FORUM_TABLES};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in FORUM_TABLES {
        assert_table_exists(&conn, table);
    }
    ensure_current(&conn).unwrap();
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forum.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "replies");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::SchemaAhead { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn migrations_report_applied_steps_and_resume_from_recorded_version() {
    let mut conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        ensure_current(&conn),
        Err(DbError::SchemaBehind { found: 0, .. })
    ));

    let applied = apply_migrations(&mut conn).unwrap();
    assert_eq!(applied, usize::try_from(latest_version()).unwrap());
    assert_eq!(apply_migrations(&mut conn).unwrap(), 0);

    conn.execute_batch("DROP INDEX idx_notifications_master_unread; PRAGMA user_version = 1;")
        .unwrap();
    assert_eq!(apply_migrations(&mut conn).unwrap(), 1);
    assert_eq!(schema_version(&conn), latest_version());
    ensure_current(&conn).unwrap();
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO replies (id, topic, author, content, created_at)
         VALUES ('r', 'missing-topic', 'missing-user', 'x', 0);",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

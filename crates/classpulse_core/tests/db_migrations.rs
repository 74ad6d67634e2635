use classpulse_core::db::migrations::{apply_migrations, latest_version};
use classpulse_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn table_exists(conn: &Connection, name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}

#[test]
fn open_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(user_version(&conn), latest_version());
    for table in [
        "teachers",
        "students",
        "assessments",
        "assessment_questions",
        "assessment_submissions",
        "question_answers",
    ] {
        assert!(table_exists(&conn, table), "missing table {table}");
    }

    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[test]
fn reopening_a_migrated_file_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("classpulse.db");

    {
        let conn = open_db(&path).unwrap();
        conn.execute(
            "INSERT INTO teachers (id, username, email, created_at)
             VALUES ('00000000-0000-0000-0000-000000000001', 'mgarcia',
                     'm.garcia@example.edu', 0);",
            [],
        )
        .unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(user_version(&conn), latest_version());

    let teachers: i64 = conn
        .query_row("SELECT COUNT(*) FROM teachers;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(teachers, 1);
}

#[test]
fn apply_migrations_rejects_newer_schema_versions() {
    let mut conn = Connection::open_in_memory().unwrap();
    let newer = latest_version() + 1;
    conn.execute_batch(&format!("PRAGMA user_version = {newer};"))
        .unwrap();

    let error = apply_migrations(&mut conn).unwrap_err();
    match error {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, newer);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn apply_migrations_is_a_no_op_at_latest_version() {
    let mut conn = open_db_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    assert_eq!(user_version(&conn), latest_version());
}

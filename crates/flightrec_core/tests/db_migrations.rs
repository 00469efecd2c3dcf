use flightrec_core::db::migrations::{latest_version, ENTITY_TABLES};
use flightrec_core::db::{open_db, open_db_in_memory, DbError};
use flightrec_core::repo::named_repo::NamedRepository;
use flightrec_core::{FlightRecorderDatabase, RepoError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in ENTITY_TABLES {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();

    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
    assert!(conn
        .execute(
            "INSERT INTO model (manufacturer_id, name) VALUES (99, 'A320');",
            [],
        )
        .is_err());
}

#[test]
fn reopening_file_store_is_idempotent_and_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flightrecorder.db");

    let conn_first = open_db(&path).unwrap();
    FlightRecorderDatabase::try_new(&conn_first)
        .unwrap()
        .create_airline("EasyJet")
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let db = FlightRecorderDatabase::try_new(&conn_second).unwrap();
    assert!(db.airline_repo().exists("EasyJet").unwrap());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn facade_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match FlightRecorderDatabase::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        }) => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection was accepted"),
    }
}

#[test]
fn facade_rejects_store_with_missing_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE sighting;").unwrap();

    assert!(matches!(
        FlightRecorderDatabase::try_new(&conn),
        Err(RepoError::MissingRequiredTable("sighting"))
    ));
}

#[test]
fn reopening_store_with_dropped_table_reports_incomplete_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("damaged.db");

    let conn = open_db(&path).unwrap();
    conn.execute_batch("PRAGMA foreign_keys = OFF; DROP TABLE sighting;")
        .unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::IncompleteSchema { version, table } => {
            assert_eq!(version, latest_version());
            assert_eq!(table, "sighting");
        }
        other => panic!("unexpected error: {other}"),
    }
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

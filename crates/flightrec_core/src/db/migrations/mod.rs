//! Versioned schema registry and executor.
//!
//! # Responsibility
//! - Register schema versions in strictly increasing order.
//! - Bring a connection up to the latest version inside one transaction.
//!
//! # Invariants
//! - `version` values are monotonic.
//! - The applied version is mirrored to `PRAGMA user_version`.
//! - A database newer than this binary is refused, never downgraded.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Tables every migrated store must contain.
pub const ENTITY_TABLES: &[&str] = &[
    "airline",
    "location",
    "manufacturer",
    "model",
    "aircraft",
    "flight",
    "sighting",
];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the connection up to [`latest_version`] and checks the entity tables.
///
/// Pending steps run in one transaction; a step that leaves an entity table
/// missing rolls the whole upgrade back.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = current_user_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    if from < latest {
        let tx = conn.transaction()?;
        for migration in MIGRATIONS.iter().filter(|migration| migration.version > from) {
            tx.execute_batch(migration.sql)?;
            tx.pragma_update(None, "user_version", migration.version)?;
            info!(
                "event=schema_migrate module=db status=ok from={from} version={}",
                migration.version
            );
        }
        require_entity_tables(&tx, latest)?;
        tx.commit()?;
        return Ok(());
    }

    require_entity_tables(conn, latest)
}

/// Reads the schema version stored in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Returns the first entry of [`ENTITY_TABLES`] absent from `conn`.
pub fn missing_entity_table(conn: &Connection) -> DbResult<Option<&'static str>> {
    let mut stmt = conn.prepare_cached(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
    )?;
    for &table in ENTITY_TABLES {
        if !stmt.query_row([table], |row| row.get::<_, bool>(0))? {
            return Ok(Some(table));
        }
    }
    Ok(None)
}

fn require_entity_tables(conn: &Connection, version: u32) -> DbResult<()> {
    match missing_entity_table(conn)? {
        Some(table) => Err(DbError::IncompleteSchema { version, table }),
        None => Ok(()),
    }
}

//! Generic table access shared by every entity repository.
//!
//! # Responsibility
//! - Provide existence, insert, first-match and all-match primitives over one
//!   table described by a [`TableSchema`].
//! - Own the repository error type.
//!
//! # Invariants
//! - Column and order-by names are checked against the schema before any SQL
//!   is built; values are always bound as parameters.
//! - Each insert is committed on its own (autocommit), with no batching.
//! - Multi-row results are ordered by the requested column, then by `id`.

use crate::db::migrations::{current_user_version, latest_version, missing_entity_table};
use crate::db::DbError;
use crate::model::entity::{EntityId, EntityValidationError, Persisted};
use rusqlite::types::ToSql;
use rusqlite::{Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

pub type RepoResult<T> = Result<T, RepoError>;

/// Finite, single-pass sequence of resolved entities.
///
/// Rows are materialized from storage when the sequence is created; nested
/// references are resolved lazily as the caller advances. Calling the
/// originating query again yields a fresh sequence.
pub type EntityIter<'a, T> = Box<dyn Iterator<Item = RepoResult<T>> + 'a>;

/// Repository error for persistence and object assembly.
#[derive(Debug)]
pub enum RepoError {
    /// Input or persisted values violate an entity invariant.
    Validation(EntityValidationError),
    Db(DbError),
    /// Column name is not part of the table schema.
    UnknownColumn { table: &'static str, column: String },
    /// Persisted rows cannot be assembled, e.g. a dangling foreign key.
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UnknownColumn { table, column } => {
                write!(f, "unknown column `{column}` for table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "flight recorder store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "flight recorder store requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EntityValidationError> for RepoError {
    fn from(value: EntityValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage description of one entity table.
///
/// `columns` lists data columns in insert order; the integer `id` primary key
/// is implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

impl TableSchema {
    pub const fn new(table: &'static str, columns: &'static [&'static str]) -> Self {
        Self { table, columns }
    }

    /// Resolves a caller-supplied column name to its schema spelling.
    pub fn column(&self, name: &str) -> RepoResult<&'static str> {
        if name == "id" {
            return Ok("id");
        }
        self.columns
            .iter()
            .copied()
            .find(|column| *column == name)
            .ok_or_else(|| RepoError::UnknownColumn {
                table: self.table,
                column: name.to_string(),
            })
    }

    fn select_sql(&self) -> String {
        format!("SELECT id, {} FROM {}", self.columns.join(", "), self.table)
    }

    fn order_sql(&self, order_by: &str) -> RepoResult<String> {
        let column = self.column(order_by)?;
        if column == "id" {
            Ok(" ORDER BY id".to_string())
        } else {
            Ok(format!(" ORDER BY {column}, id"))
        }
    }
}

/// Exact-match condition on one column.
#[derive(Clone, Copy)]
pub struct Filter<'a> {
    pub column: &'a str,
    pub value: &'a dyn ToSql,
}

impl<'a> Filter<'a> {
    pub fn eq(column: &'a str, value: &'a dyn ToSql) -> Self {
        Self { column, value }
    }
}

/// Raw row of one table, convertible to and from SQLite values.
pub trait TableRecord: Sized {
    /// Row identity; `None` before insert.
    fn id(&self) -> Option<EntityId>;

    /// Returns the record carrying the identity assigned by the store.
    fn with_id(self, id: EntityId) -> Self;

    /// Values in the schema's column order.
    fn bind_values(&self) -> Vec<&dyn ToSql>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Schema-parameterized CRUD primitives over one table.
pub struct BaseRepository<'conn, R> {
    conn: &'conn Connection,
    schema: TableSchema,
    _record: PhantomData<fn() -> R>,
}

impl<'conn, R: TableRecord> BaseRepository<'conn, R> {
    pub fn new(conn: &'conn Connection, schema: TableSchema) -> Self {
        Self {
            conn,
            schema,
            _record: PhantomData,
        }
    }

    pub fn schema(&self) -> TableSchema {
        self.schema
    }

    /// Returns whether at least one row matches `column = value` exactly.
    pub fn exists(&self, column: &str, value: &dyn ToSql) -> RepoResult<bool> {
        let column = self.schema.column(column)?;
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {column} = ?1);",
            self.schema.table
        );
        let exists: i64 = self
            .conn
            .prepare_cached(&sql)?
            .query_row([value], |row| row.get(0))?;
        Ok(exists == 1)
    }

    /// Appends a row and returns the record with its new identity.
    pub fn insert(&self, record: R) -> RepoResult<R> {
        let placeholders = (1..=self.schema.columns.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders});",
            self.schema.table,
            self.schema.columns.join(", ")
        );

        {
            let values = record.bind_values();
            self.conn.prepare_cached(&sql)?.execute(values.as_slice())?;
        }

        Ok(record.with_id(self.conn.last_insert_rowid()))
    }

    /// Returns the lowest-identity row matching `column = value`.
    pub fn first(&self, column: &str, value: &dyn ToSql) -> RepoResult<Option<R>> {
        let column = self.schema.column(column)?;
        let sql = format!(
            "{} WHERE {column} = ?1 ORDER BY id LIMIT 1;",
            self.schema.select_sql()
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let mut rows = stmt.query([value])?;
        let record = match rows.next()? {
            Some(row) => Some(R::from_row(row)?),
            None => None,
        };
        Ok(record)
    }

    /// Returns all rows matching an optional exact filter.
    ///
    /// `None` means no filtering: every row of the table is returned.
    pub fn all(
        &self,
        filter: Option<Filter<'_>>,
        order_by: &str,
    ) -> RepoResult<std::vec::IntoIter<R>> {
        match filter {
            Some(filter) => self.all_matching(&[filter], order_by),
            None => self.all_matching(&[], order_by),
        }
    }

    /// Returns all rows matching every filter (conjunction).
    pub fn all_matching(
        &self,
        filters: &[Filter<'_>],
        order_by: &str,
    ) -> RepoResult<std::vec::IntoIter<R>> {
        let mut sql = self.schema.select_sql();
        let mut values: Vec<&dyn ToSql> = Vec::with_capacity(filters.len());
        for (index, filter) in filters.iter().enumerate() {
            let column = self.schema.column(filter.column)?;
            let keyword = if index == 0 { "WHERE" } else { "AND" };
            sql.push_str(&format!(" {keyword} {column} = ?{}", index + 1));
            values.push(filter.value);
        }
        sql.push_str(&self.schema.order_sql(order_by)?);

        self.collect(&sql, values.as_slice())
    }

    /// Returns all rows whose `column` contains `value` as a substring.
    pub fn like(
        &self,
        column: &str,
        value: &str,
        order_by: &str,
    ) -> RepoResult<std::vec::IntoIter<R>> {
        let column = self.schema.column(column)?;
        let sql = format!(
            "{} WHERE {column} LIKE ?1{}",
            self.schema.select_sql(),
            self.schema.order_sql(order_by)?
        );
        let pattern = format!("%{value}%");
        self.collect(&sql, &[&pattern as &dyn ToSql])
    }

    /// Returns all rows with `from <= column < to`.
    pub fn range(
        &self,
        column: &str,
        from: &dyn ToSql,
        to: &dyn ToSql,
        order_by: &str,
    ) -> RepoResult<std::vec::IntoIter<R>> {
        let column = self.schema.column(column)?;
        let sql = format!(
            "{} WHERE {column} >= ?1 AND {column} < ?2{}",
            self.schema.select_sql(),
            self.schema.order_sql(order_by)?
        );
        self.collect(&sql, &[from, to])
    }

    fn collect(&self, sql: &str, values: &[&dyn ToSql]) -> RepoResult<std::vec::IntoIter<R>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let records = stmt
            .query_map(values, |row| R::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records.into_iter())
    }
}

/// Checks that `conn` carries the full flight recorder schema.
pub fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version = current_user_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if let Some(table) = missing_entity_table(conn)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    Ok(())
}

/// Maps a missing referenced row to a data error naming both ends.
pub(crate) fn require_reference<T>(
    entity: Option<T>,
    owner: &str,
    owner_id: Option<EntityId>,
    target: &str,
    target_id: EntityId,
) -> RepoResult<T> {
    entity.ok_or_else(|| {
        RepoError::InvalidData(format!(
            "{owner} {} references missing {target} {target_id}",
            owner_id.map_or_else(|| "?".to_string(), |id| id.to_string())
        ))
    })
}

/// Returns the identity of an entity read back from storage.
pub(crate) fn persisted_id(entity: &impl Persisted, table: &str) -> RepoResult<EntityId> {
    entity
        .id()
        .ok_or_else(|| RepoError::InvalidData(format!("{table} has no persisted identity")))
}

/// Maps a row that vanished between insert and read-back to a data error.
pub(crate) fn created<T>(entity: Option<T>, table: &str, key: &str) -> RepoResult<T> {
    entity.ok_or_else(|| RepoError::InvalidData(format!("{table} `{key}` missing after create")))
}

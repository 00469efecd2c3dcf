//! Find-or-create repository for name-keyed reference entities.
//!
//! # Responsibility
//! - Serve the `airline`, `location` and `manufacturer` tables through one
//!   generic implementation.
//!
//! # Invariants
//! - `create` never inserts a second row for a name that already exists.
//! - `create` validates the name before touching storage.

use crate::model::entity::EntityId;
use crate::model::named::{Airline, Location, Manufacturer, NamedEntity};
use crate::repo::base::{
    created, BaseRepository, EntityIter, RepoResult, TableRecord, TableSchema,
};
use log::debug;
use rusqlite::types::ToSql;
use rusqlite::{Connection, Row};
use std::marker::PhantomData;

const NAMED_COLUMNS: &[&str] = &["name"];

/// Raw row of a name-keyed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRecord {
    pub id: Option<EntityId>,
    pub name: String,
}

impl TableRecord for NamedRecord {
    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn with_id(self, id: EntityId) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }

    fn bind_values(&self) -> Vec<&dyn ToSql> {
        vec![&self.name]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            name: row.get("name")?,
        })
    }
}

/// Repository contract for name-keyed entities.
pub trait NamedRepository<E: NamedEntity> {
    /// Returns whether an entity with exactly this name is stored.
    fn exists(&self, name: &str) -> RepoResult<bool>;

    /// Reads the first entity matching `column = value`.
    fn read(&self, column: &str, value: &dyn ToSql) -> RepoResult<Option<E>>;

    /// Reads every stored entity ordered by name.
    fn read_all(&self) -> RepoResult<EntityIter<'_, E>>;

    /// Returns the entity with this name, inserting it first if needed.
    fn create(&self, name: &str) -> RepoResult<E>;
}

/// SQLite-backed repository for one name-keyed entity type.
pub struct SqliteNamedRepository<'conn, E> {
    base: BaseRepository<'conn, NamedRecord>,
    _entity: PhantomData<fn() -> E>,
}

pub type SqliteAirlineRepository<'conn> = SqliteNamedRepository<'conn, Airline>;
pub type SqliteLocationRepository<'conn> = SqliteNamedRepository<'conn, Location>;
pub type SqliteManufacturerRepository<'conn> = SqliteNamedRepository<'conn, Manufacturer>;

impl<'conn, E: NamedEntity> SqliteNamedRepository<'conn, E> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            base: BaseRepository::new(conn, TableSchema::new(E::TABLE, NAMED_COLUMNS)),
            _entity: PhantomData,
        }
    }

    /// Reads entities whose name contains `fragment`, ordered by name.
    pub fn search(&self, fragment: &str) -> RepoResult<EntityIter<'_, E>> {
        let records = self.base.like("name", fragment, "name")?;
        Ok(Box::new(records.map(to_entity::<E>)))
    }
}

impl<E: NamedEntity> NamedRepository<E> for SqliteNamedRepository<'_, E> {
    fn exists(&self, name: &str) -> RepoResult<bool> {
        self.base.exists("name", &name)
    }

    fn read(&self, column: &str, value: &dyn ToSql) -> RepoResult<Option<E>> {
        self.base.first(column, value)?.map(to_entity::<E>).transpose()
    }

    fn read_all(&self) -> RepoResult<EntityIter<'_, E>> {
        let records = self.base.all(None, "name")?;
        Ok(Box::new(records.map(to_entity::<E>)))
    }

    fn create(&self, name: &str) -> RepoResult<E> {
        if !self.exists(name)? {
            E::from_parts(name.to_string(), None)?;
            let record = self.base.insert(NamedRecord {
                id: None,
                name: name.to_string(),
            })?;
            debug!(
                "event=entity_created module=repo status=ok table={} id={}",
                E::TABLE,
                record.id.unwrap_or_default()
            );
        }

        created(self.read("name", &name)?, E::TABLE, name)
    }
}

fn to_entity<E: NamedEntity>(record: NamedRecord) -> RepoResult<E> {
    Ok(E::from_parts(record.name, record.id)?)
}

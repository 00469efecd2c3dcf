//! Aircraft model repository.
//!
//! # Invariants
//! - Model names are unique across all manufacturers: `create` with a known
//!   name returns the stored model even if a different manufacturer is given.
//! - Every stored model references an existing manufacturer.

use crate::model::aircraft_model::Model;
use crate::model::entity::{validate_non_empty, EntityId};
use crate::model::named::Manufacturer;
use crate::repo::base::{
    created, persisted_id, require_reference, BaseRepository, EntityIter, Filter, RepoResult,
    TableRecord, TableSchema,
};
use crate::repo::named_repo::{NamedRepository, SqliteManufacturerRepository};
use log::debug;
use rusqlite::types::ToSql;
use rusqlite::{Connection, Row};

const MODEL_SCHEMA: TableSchema = TableSchema::new("model", &["manufacturer_id", "name"]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRecord {
    pub id: Option<EntityId>,
    pub manufacturer_id: EntityId,
    pub name: String,
}

impl TableRecord for ModelRecord {
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
        vec![&self.manufacturer_id, &self.name]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            manufacturer_id: row.get("manufacturer_id")?,
            name: row.get("name")?,
        })
    }
}

/// Repository contract for aircraft models.
pub trait ModelRepository {
    fn exists(&self, name: &str) -> RepoResult<bool>;

    /// Reads the first model matching `column = value` with its manufacturer.
    fn read(&self, column: &str, value: &dyn ToSql) -> RepoResult<Option<Model>>;

    /// Reads the models built by `manufacturer`, ordered by model name.
    ///
    /// Yields nothing when the manufacturer is unknown.
    fn read_all_for_manufacturer(&self, manufacturer: &str) -> RepoResult<EntityIter<'_, Model>>;

    /// Returns the model with this name, creating it and its manufacturer if
    /// needed.
    fn create(&self, name: &str, manufacturer: &str) -> RepoResult<Model>;
}

/// SQLite-backed model repository.
///
/// Manufacturers are resolved and created through `M`.
pub struct SqliteModelRepository<'conn, M = SqliteManufacturerRepository<'conn>> {
    base: BaseRepository<'conn, ModelRecord>,
    manufacturers: M,
}

impl<'conn> SqliteModelRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_manufacturers(conn, SqliteManufacturerRepository::new(conn))
    }
}

impl<'conn, M: NamedRepository<Manufacturer>> SqliteModelRepository<'conn, M> {
    pub fn with_manufacturers(conn: &'conn Connection, manufacturers: M) -> Self {
        Self {
            base: BaseRepository::new(conn, MODEL_SCHEMA),
            manufacturers,
        }
    }

    fn resolve(&self, record: ModelRecord) -> RepoResult<Model> {
        let manufacturer = self.manufacturers.read("id", &record.manufacturer_id)?;
        let manufacturer = require_reference(
            manufacturer,
            MODEL_SCHEMA.table,
            record.id,
            "manufacturer",
            record.manufacturer_id,
        )?;
        Ok(Model::from_parts(record.name, manufacturer, record.id)?)
    }
}

impl<M: NamedRepository<Manufacturer>> ModelRepository for SqliteModelRepository<'_, M> {
    fn exists(&self, name: &str) -> RepoResult<bool> {
        self.base.exists("name", &name)
    }

    fn read(&self, column: &str, value: &dyn ToSql) -> RepoResult<Option<Model>> {
        self.base
            .first(column, value)?
            .map(|record| self.resolve(record))
            .transpose()
    }

    fn read_all_for_manufacturer(&self, manufacturer: &str) -> RepoResult<EntityIter<'_, Model>> {
        let Some(manufacturer) = self.manufacturers.read("name", &manufacturer)? else {
            return Ok(Box::new(std::iter::empty()));
        };
        let manufacturer_id = persisted_id(&manufacturer, "manufacturer")?;
        let records = self
            .base
            .all(Some(Filter::eq("manufacturer_id", &manufacturer_id)), "name")?;
        Ok(Box::new(records.map(move |record| -> RepoResult<Model> {
            Ok(Model::from_parts(
                record.name,
                manufacturer.clone(),
                record.id,
            )?)
        })))
    }

    fn create(&self, name: &str, manufacturer: &str) -> RepoResult<Model> {
        if !self.exists(name)? {
            validate_non_empty("name", name)?;
            let manufacturer = self.manufacturers.create(manufacturer)?;
            let record = self.base.insert(ModelRecord {
                id: None,
                manufacturer_id: persisted_id(&manufacturer, "manufacturer")?,
                name: name.to_string(),
            })?;
            debug!(
                "event=entity_created module=repo status=ok table={} id={}",
                MODEL_SCHEMA.table,
                record.id.unwrap_or_default()
            );
        }

        created(self.read("name", &name)?, MODEL_SCHEMA.table, name)
    }
}

//! Aircraft repository.
//!
//! # Invariants
//! - Aircraft are unique by registration.
//! - Field validation runs before the model chain is created, so rejected
//!   input leaves no rows behind.

use crate::model::aircraft::Aircraft;
use crate::model::entity::EntityId;
use crate::repo::base::{
    created, persisted_id, require_reference, BaseRepository, EntityIter, Filter, RepoResult,
    TableRecord, TableSchema,
};
use crate::repo::model_repo::{ModelRepository, SqliteModelRepository};
use log::debug;
use rusqlite::types::ToSql;
use rusqlite::{Connection, Row};

const AIRCRAFT_SCHEMA: TableSchema = TableSchema::new(
    "aircraft",
    &["model_id", "registration", "serial_number", "manufactured"],
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AircraftRecord {
    pub id: Option<EntityId>,
    pub model_id: EntityId,
    pub registration: String,
    pub serial_number: String,
    pub manufactured: i32,
}

impl TableRecord for AircraftRecord {
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
        vec![
            &self.model_id,
            &self.registration,
            &self.serial_number,
            &self.manufactured,
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            model_id: row.get("model_id")?,
            registration: row.get("registration")?,
            serial_number: row.get("serial_number")?,
            manufactured: row.get("manufactured")?,
        })
    }
}

/// Repository contract for aircraft.
pub trait AircraftRepository {
    fn exists(&self, registration: &str) -> RepoResult<bool>;

    fn read(&self, column: &str, value: &dyn ToSql) -> RepoResult<Option<Aircraft>>;

    /// Reads aircraft matching an optional exact filter.
    fn read_all(
        &self,
        filter: Option<Filter<'_>>,
        order_by: &str,
    ) -> RepoResult<EntityIter<'_, Aircraft>>;

    /// Returns the aircraft with this registration, creating it together with
    /// its model and manufacturer if needed.
    fn create(
        &self,
        registration: &str,
        serial_number: &str,
        manufactured: i32,
        model: &str,
        manufacturer: &str,
    ) -> RepoResult<Aircraft>;
}

pub struct SqliteAircraftRepository<'conn, M = SqliteModelRepository<'conn>> {
    base: BaseRepository<'conn, AircraftRecord>,
    models: M,
}

impl<'conn> SqliteAircraftRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_models(conn, SqliteModelRepository::new(conn))
    }
}

impl<'conn, M: ModelRepository> SqliteAircraftRepository<'conn, M> {
    pub fn with_models(conn: &'conn Connection, models: M) -> Self {
        Self {
            base: BaseRepository::new(conn, AIRCRAFT_SCHEMA),
            models,
        }
    }

    /// Reads aircraft whose registration contains `fragment`.
    pub fn search(&self, fragment: &str) -> RepoResult<EntityIter<'_, Aircraft>> {
        let records = self.base.like("registration", fragment, "registration")?;
        Ok(Box::new(records.map(move |record| self.resolve(record))))
    }

    fn resolve(&self, record: AircraftRecord) -> RepoResult<Aircraft> {
        let model = self.models.read("id", &record.model_id)?;
        let model = require_reference(
            model,
            AIRCRAFT_SCHEMA.table,
            record.id,
            "model",
            record.model_id,
        )?;
        Ok(Aircraft::from_parts(
            record.registration,
            record.serial_number,
            record.manufactured,
            model,
            record.id,
        )?)
    }
}

impl<M: ModelRepository> AircraftRepository for SqliteAircraftRepository<'_, M> {
    fn exists(&self, registration: &str) -> RepoResult<bool> {
        self.base.exists("registration", &registration)
    }

    fn read(&self, column: &str, value: &dyn ToSql) -> RepoResult<Option<Aircraft>> {
        self.base
            .first(column, value)?
            .map(|record| self.resolve(record))
            .transpose()
    }

    fn read_all(
        &self,
        filter: Option<Filter<'_>>,
        order_by: &str,
    ) -> RepoResult<EntityIter<'_, Aircraft>> {
        let records = self.base.all(filter, order_by)?;
        Ok(Box::new(records.map(move |record| self.resolve(record))))
    }

    fn create(
        &self,
        registration: &str,
        serial_number: &str,
        manufactured: i32,
        model: &str,
        manufacturer: &str,
    ) -> RepoResult<Aircraft> {
        if !self.exists(registration)? {
            Aircraft::validate_fields(registration, serial_number, manufactured)?;
            let model = self.models.create(model, manufacturer)?;
            let record = self.base.insert(AircraftRecord {
                id: None,
                model_id: persisted_id(&model, "model")?,
                registration: registration.to_string(),
                serial_number: serial_number.to_string(),
                manufactured,
            })?;
            debug!(
                "event=entity_created module=repo status=ok table={} id={}",
                AIRCRAFT_SCHEMA.table,
                record.id.unwrap_or_default()
            );
        }

        created(
            self.read("registration", &registration)?,
            AIRCRAFT_SCHEMA.table,
            registration,
        )
    }
}

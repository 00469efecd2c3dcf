//! Sighting repository, the aggregate root of the store.
//!
//! # Responsibility
//! - Record observations against existing locations, flights and aircraft.
//! - Resolve stored sightings into fully populated aggregates.
//!
//! # Invariants
//! - `insert` never deduplicates: every call appends one row.
//! - A negative altitude is rejected before any row is written.

use crate::model::entity::EntityId;
use crate::model::named::Location;
use crate::model::sighting::Sighting;
use crate::repo::aircraft_repo::{AircraftRepository, SqliteAircraftRepository};
use crate::repo::base::{
    created, require_reference, BaseRepository, EntityIter, Filter, RepoResult, TableRecord,
    TableSchema,
};
use crate::repo::flight_repo::{FlightRepository, SqliteFlightRepository};
use crate::repo::named_repo::{NamedRepository, SqliteLocationRepository};
use chrono::NaiveDateTime;
use log::info;
use rusqlite::types::ToSql;
use rusqlite::{Connection, Row};

const SIGHTING_SCHEMA: TableSchema = TableSchema::new(
    "sighting",
    &["location_id", "flight_id", "aircraft_id", "altitude", "date"],
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SightingRecord {
    pub id: Option<EntityId>,
    pub location_id: EntityId,
    pub flight_id: EntityId,
    pub aircraft_id: EntityId,
    pub altitude: i64,
    pub date: NaiveDateTime,
}

impl TableRecord for SightingRecord {
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
            &self.location_id,
            &self.flight_id,
            &self.aircraft_id,
            &self.altitude,
            &self.date,
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            location_id: row.get("location_id")?,
            flight_id: row.get("flight_id")?,
            aircraft_id: row.get("aircraft_id")?,
            altitude: row.get("altitude")?,
            date: row.get("date")?,
        })
    }
}

/// Repository contract for sightings.
pub trait SightingRepository {
    /// Appends a sighting referencing existing rows and returns it resolved.
    fn insert(
        &self,
        altitude: i64,
        date: NaiveDateTime,
        location_id: EntityId,
        flight_id: EntityId,
        aircraft_id: EntityId,
    ) -> RepoResult<Sighting>;

    fn read(&self, id: EntityId) -> RepoResult<Option<Sighting>>;

    /// Reads sightings matching an optional exact filter.
    ///
    /// Pass `"id"` as `order_by` for insertion order.
    fn read_all(
        &self,
        filter: Option<Filter<'_>>,
        order_by: &str,
    ) -> RepoResult<EntityIter<'_, Sighting>>;

    /// Reads sightings with `from <= date < to`, ordered by date.
    fn read_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepoResult<EntityIter<'_, Sighting>>;
}

pub struct SqliteSightingRepository<
    'conn,
    L = SqliteLocationRepository<'conn>,
    F = SqliteFlightRepository<'conn>,
    A = SqliteAircraftRepository<'conn>,
> {
    base: BaseRepository<'conn, SightingRecord>,
    locations: L,
    flights: F,
    aircraft: A,
}

impl<'conn> SqliteSightingRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_dependencies(
            conn,
            SqliteLocationRepository::new(conn),
            SqliteFlightRepository::new(conn),
            SqliteAircraftRepository::new(conn),
        )
    }
}

impl<'conn, L, F, A> SqliteSightingRepository<'conn, L, F, A>
where
    L: NamedRepository<Location>,
    F: FlightRepository,
    A: AircraftRepository,
{
    pub fn with_dependencies(conn: &'conn Connection, locations: L, flights: F, aircraft: A) -> Self {
        Self {
            base: BaseRepository::new(conn, SIGHTING_SCHEMA),
            locations,
            flights,
            aircraft,
        }
    }

    fn resolve(&self, record: SightingRecord) -> RepoResult<Sighting> {
        let table = SIGHTING_SCHEMA.table;
        let location = require_reference(
            self.locations.read("id", &record.location_id)?,
            table,
            record.id,
            "location",
            record.location_id,
        )?;
        let flight = require_reference(
            self.flights.read("id", &record.flight_id)?,
            table,
            record.id,
            "flight",
            record.flight_id,
        )?;
        let aircraft = require_reference(
            self.aircraft.read("id", &record.aircraft_id)?,
            table,
            record.id,
            "aircraft",
            record.aircraft_id,
        )?;
        Ok(Sighting::from_parts(
            record.altitude,
            record.date,
            location,
            flight,
            aircraft,
            record.id,
        )?)
    }
}

impl<L, F, A> SightingRepository for SqliteSightingRepository<'_, L, F, A>
where
    L: NamedRepository<Location>,
    F: FlightRepository,
    A: AircraftRepository,
{
    fn insert(
        &self,
        altitude: i64,
        date: NaiveDateTime,
        location_id: EntityId,
        flight_id: EntityId,
        aircraft_id: EntityId,
    ) -> RepoResult<Sighting> {
        Sighting::validate_altitude(altitude)?;
        let record = self.base.insert(SightingRecord {
            id: None,
            location_id,
            flight_id,
            aircraft_id,
            altitude,
            date,
        })?;
        let id = record.id.unwrap_or_default();
        info!(
            "event=sighting_recorded module=repo status=ok id={id} flight_id={flight_id} aircraft_id={aircraft_id}"
        );

        created(self.read(id)?, SIGHTING_SCHEMA.table, &id.to_string())
    }

    fn read(&self, id: EntityId) -> RepoResult<Option<Sighting>> {
        self.base
            .first("id", &id)?
            .map(|record| self.resolve(record))
            .transpose()
    }

    fn read_all(
        &self,
        filter: Option<Filter<'_>>,
        order_by: &str,
    ) -> RepoResult<EntityIter<'_, Sighting>> {
        let records = self.base.all(filter, order_by)?;
        Ok(Box::new(records.map(move |record| self.resolve(record))))
    }

    fn read_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepoResult<EntityIter<'_, Sighting>> {
        let records = self.base.range("date", &from, &to, "date")?;
        Ok(Box::new(records.map(move |record| self.resolve(record))))
    }
}

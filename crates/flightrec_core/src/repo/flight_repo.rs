//! Flight repository.
//!
//! # Invariants
//! - Flights are unique by number.
//! - Route queries return flights ordered by identity.

use crate::model::entity::EntityId;
use crate::model::flight::Flight;
use crate::model::named::Airline;
use crate::repo::base::{
    created, persisted_id, require_reference, BaseRepository, EntityIter, Filter, RepoResult,
    TableRecord, TableSchema,
};
use crate::repo::named_repo::{NamedRepository, SqliteAirlineRepository};
use log::debug;
use rusqlite::types::ToSql;
use rusqlite::{Connection, Row};

const FLIGHT_SCHEMA: TableSchema = TableSchema::new(
    "flight",
    &["airline_id", "number", "embarkation", "destination"],
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightRecord {
    pub id: Option<EntityId>,
    pub airline_id: EntityId,
    pub number: String,
    pub embarkation: String,
    pub destination: String,
}

impl TableRecord for FlightRecord {
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
            &self.airline_id,
            &self.number,
            &self.embarkation,
            &self.destination,
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            airline_id: row.get("airline_id")?,
            number: row.get("number")?,
            embarkation: row.get("embarkation")?,
            destination: row.get("destination")?,
        })
    }
}

/// Repository contract for flights.
pub trait FlightRepository {
    fn exists(&self, number: &str) -> RepoResult<bool>;

    fn read(&self, column: &str, value: &dyn ToSql) -> RepoResult<Option<Flight>>;

    fn read_all(
        &self,
        filter: Option<Filter<'_>>,
        order_by: &str,
    ) -> RepoResult<EntityIter<'_, Flight>>;

    /// Reads flights by embarkation, destination, or both.
    ///
    /// Yields nothing when neither airport is given.
    fn query_flights_by_route(
        &self,
        embarkation: Option<&str>,
        destination: Option<&str>,
    ) -> RepoResult<EntityIter<'_, Flight>>;

    /// Returns the flight with this number, creating it and its airline if
    /// needed.
    fn create(
        &self,
        number: &str,
        embarkation: &str,
        destination: &str,
        airline: &str,
    ) -> RepoResult<Flight>;
}

pub struct SqliteFlightRepository<'conn, A = SqliteAirlineRepository<'conn>> {
    base: BaseRepository<'conn, FlightRecord>,
    airlines: A,
}

impl<'conn> SqliteFlightRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_airlines(conn, SqliteAirlineRepository::new(conn))
    }
}

impl<'conn, A: NamedRepository<Airline>> SqliteFlightRepository<'conn, A> {
    pub fn with_airlines(conn: &'conn Connection, airlines: A) -> Self {
        Self {
            base: BaseRepository::new(conn, FLIGHT_SCHEMA),
            airlines,
        }
    }

    fn resolve(&self, record: FlightRecord) -> RepoResult<Flight> {
        let airline = self.airlines.read("id", &record.airline_id)?;
        let airline = require_reference(
            airline,
            FLIGHT_SCHEMA.table,
            record.id,
            "airline",
            record.airline_id,
        )?;
        Ok(Flight::from_parts(
            record.number,
            record.embarkation,
            record.destination,
            airline,
            record.id,
        )?)
    }
}

impl<A: NamedRepository<Airline>> FlightRepository for SqliteFlightRepository<'_, A> {
    fn exists(&self, number: &str) -> RepoResult<bool> {
        self.base.exists("number", &number)
    }

    fn read(&self, column: &str, value: &dyn ToSql) -> RepoResult<Option<Flight>> {
        self.base
            .first(column, value)?
            .map(|record| self.resolve(record))
            .transpose()
    }

    fn read_all(
        &self,
        filter: Option<Filter<'_>>,
        order_by: &str,
    ) -> RepoResult<EntityIter<'_, Flight>> {
        let records = self.base.all(filter, order_by)?;
        Ok(Box::new(records.map(move |record| self.resolve(record))))
    }

    fn query_flights_by_route(
        &self,
        embarkation: Option<&str>,
        destination: Option<&str>,
    ) -> RepoResult<EntityIter<'_, Flight>> {
        let records = match (embarkation, destination) {
            (Some(embarkation), Some(destination)) => self.base.all_matching(
                &[
                    Filter::eq("embarkation", &embarkation),
                    Filter::eq("destination", &destination),
                ],
                "id",
            )?,
            (Some(embarkation), None) => self
                .base
                .all(Some(Filter::eq("embarkation", &embarkation)), "id")?,
            (None, Some(destination)) => self
                .base
                .all(Some(Filter::eq("destination", &destination)), "id")?,
            (None, None) => return Ok(Box::new(std::iter::empty())),
        };
        Ok(Box::new(records.map(move |record| self.resolve(record))))
    }

    fn create(
        &self,
        number: &str,
        embarkation: &str,
        destination: &str,
        airline: &str,
    ) -> RepoResult<Flight> {
        if !self.exists(number)? {
            Flight::validate_route(embarkation, destination)?;
            let airline = self.airlines.create(airline)?;
            let record = self.base.insert(FlightRecord {
                id: None,
                airline_id: persisted_id(&airline, "airline")?,
                number: number.to_string(),
                embarkation: embarkation.to_string(),
                destination: destination.to_string(),
            })?;
            debug!(
                "event=entity_created module=repo status=ok table={} id={}",
                FLIGHT_SCHEMA.table,
                record.id.unwrap_or_default()
            );
        }

        created(self.read("number", &number)?, FLIGHT_SCHEMA.table, number)
    }
}

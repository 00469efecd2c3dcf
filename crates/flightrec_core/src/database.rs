//! Flight recorder database façade.
//!
//! # Responsibility
//! - Own the seven repositories over one borrowed connection.
//! - Offer the create entry points used by data entry and bulk import.
//! - Answer cross-entity sighting queries.
//!
//! # Invariants
//! - The connection must already be migrated; construction verifies it.
//! - Query results separate "unknown key" from "known key, no sightings".

use crate::model::aircraft::Aircraft;
use crate::model::aircraft_model::Model;
use crate::model::entity::EntityId;
use crate::model::flight::Flight;
use crate::model::named::{Airline, Location, Manufacturer};
use crate::model::sighting::Sighting;
use crate::repo::aircraft_repo::{AircraftRepository, SqliteAircraftRepository};
use crate::repo::base::{
    ensure_schema_ready, persisted_id, EntityIter, Filter, RepoResult,
};
use crate::repo::flight_repo::{FlightRepository, SqliteFlightRepository};
use crate::repo::model_repo::{ModelRepository, SqliteModelRepository};
use crate::repo::named_repo::{
    NamedRepository, SqliteAirlineRepository, SqliteLocationRepository,
    SqliteManufacturerRepository,
};
use crate::repo::sighting_repo::{SightingRepository, SqliteSightingRepository};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::Connection;

/// Result of a sighting query.
pub enum SightingQuery<'a> {
    /// The filter key exists; the sequence may still be empty.
    Sightings(EntityIter<'a, Sighting>),
    /// No stored entity matches the filter key.
    UnknownKey,
}

impl<'a> SightingQuery<'a> {
    pub fn is_unknown_key(&self) -> bool {
        matches!(self, Self::UnknownKey)
    }

    /// Returns the sightings, or `None` for an unknown key.
    pub fn into_sightings(self) -> Option<EntityIter<'a, Sighting>> {
        match self {
            Self::Sightings(sightings) => Some(sightings),
            Self::UnknownKey => None,
        }
    }
}

impl<'a> IntoIterator for SightingQuery<'a> {
    type Item = RepoResult<Sighting>;
    type IntoIter = EntityIter<'a, Sighting>;

    /// Unknown keys iterate as an empty sequence.
    fn into_iter(self) -> Self::IntoIter {
        match self {
            Self::Sightings(sightings) => sightings,
            Self::UnknownKey => Box::new(std::iter::empty()),
        }
    }
}

/// Entry point to a flight recorder store.
pub struct FlightRecorderDatabase<'conn> {
    airlines: SqliteAirlineRepository<'conn>,
    locations: SqliteLocationRepository<'conn>,
    manufacturers: SqliteManufacturerRepository<'conn>,
    models: SqliteModelRepository<'conn>,
    aircraft: SqliteAircraftRepository<'conn>,
    flights: SqliteFlightRepository<'conn>,
    sightings: SqliteSightingRepository<'conn>,
}

impl<'conn> FlightRecorderDatabase<'conn> {
    /// Builds the façade over a connection from `db::open_db*`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version does not match.
    /// - `MissingRequiredTable` when an entity table is absent.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self {
            airlines: SqliteAirlineRepository::new(conn),
            locations: SqliteLocationRepository::new(conn),
            manufacturers: SqliteManufacturerRepository::new(conn),
            models: SqliteModelRepository::new(conn),
            aircraft: SqliteAircraftRepository::new(conn),
            flights: SqliteFlightRepository::new(conn),
            sightings: SqliteSightingRepository::new(conn),
        })
    }

    pub fn airline_repo(&self) -> &SqliteAirlineRepository<'conn> {
        &self.airlines
    }

    pub fn location_repo(&self) -> &SqliteLocationRepository<'conn> {
        &self.locations
    }

    pub fn manufacturer_repo(&self) -> &SqliteManufacturerRepository<'conn> {
        &self.manufacturers
    }

    pub fn model_repo(&self) -> &SqliteModelRepository<'conn> {
        &self.models
    }

    pub fn aircraft_repo(&self) -> &SqliteAircraftRepository<'conn> {
        &self.aircraft
    }

    pub fn flight_repo(&self) -> &SqliteFlightRepository<'conn> {
        &self.flights
    }

    pub fn sighting_repo(&self) -> &SqliteSightingRepository<'conn> {
        &self.sightings
    }

    pub fn create_airline(&self, name: &str) -> RepoResult<Airline> {
        self.airlines.create(name)
    }

    pub fn create_location(&self, name: &str) -> RepoResult<Location> {
        self.locations.create(name)
    }

    pub fn create_manufacturer(&self, name: &str) -> RepoResult<Manufacturer> {
        self.manufacturers.create(name)
    }

    pub fn create_model(&self, name: &str, manufacturer: &str) -> RepoResult<Model> {
        self.models.create(name, manufacturer)
    }

    pub fn create_aircraft(
        &self,
        registration: &str,
        serial_number: &str,
        manufactured: i32,
        model: &str,
        manufacturer: &str,
    ) -> RepoResult<Aircraft> {
        self.aircraft
            .create(registration, serial_number, manufactured, model, manufacturer)
    }

    pub fn create_flight(
        &self,
        number: &str,
        embarkation: &str,
        destination: &str,
        airline: &str,
    ) -> RepoResult<Flight> {
        self.flights
            .create(number, embarkation, destination, airline)
    }

    /// Records a new sighting; never deduplicates.
    pub fn create_sighting(
        &self,
        altitude: i64,
        date: NaiveDateTime,
        location_id: EntityId,
        flight_id: EntityId,
        aircraft_id: EntityId,
    ) -> RepoResult<Sighting> {
        self.sightings
            .insert(altitude, date, location_id, flight_id, aircraft_id)
    }

    /// Models built by `manufacturer`, ordered by name.
    pub fn read_models(&self, manufacturer: &str) -> RepoResult<EntityIter<'_, Model>> {
        self.models.read_all_for_manufacturer(manufacturer)
    }

    /// Sightings of every flight with this number, each ordered by date.
    pub fn query_sightings_by_flight(&self, number: &str) -> RepoResult<SightingQuery<'_>> {
        if !self.flights.exists(number)? {
            return Ok(SightingQuery::UnknownKey);
        }
        let flights = self
            .flights
            .read_all(Some(Filter::eq("number", &number)), "id")?;
        Ok(SightingQuery::Sightings(Box::new(flights.flat_map(
            move |flight| self.sightings_of_flight(flight, "date"),
        ))))
    }

    /// Sightings of one aircraft ordered by date.
    pub fn query_sightings_by_aircraft(&self, registration: &str) -> RepoResult<SightingQuery<'_>> {
        let Some(aircraft) = self.aircraft.read("registration", &registration)? else {
            return Ok(SightingQuery::UnknownKey);
        };
        let aircraft_id = persisted_id(&aircraft, "aircraft")?;
        let sightings = self
            .sightings
            .read_all(Some(Filter::eq("aircraft_id", &aircraft_id)), "date")?;
        Ok(SightingQuery::Sightings(sightings))
    }

    /// Sightings of every flight on a route.
    ///
    /// Flights are visited by identity and each flight's sightings are
    /// ordered by identity. A route without flights, including one with
    /// neither airport given, is an unknown key.
    pub fn query_sightings_by_route(
        &self,
        embarkation: Option<&str>,
        destination: Option<&str>,
    ) -> RepoResult<SightingQuery<'_>> {
        let mut flights = self
            .flights
            .query_flights_by_route(embarkation, destination)?
            .peekable();
        if flights.peek().is_none() {
            return Ok(SightingQuery::UnknownKey);
        }
        Ok(SightingQuery::Sightings(Box::new(flights.flat_map(
            move |flight| self.sightings_of_flight(flight, "id"),
        ))))
    }

    /// Sightings of every flight operated by an airline, each ordered by date.
    pub fn query_sightings_by_airline(&self, airline: &str) -> RepoResult<SightingQuery<'_>> {
        let Some(airline) = self.airlines.read("name", &airline)? else {
            return Ok(SightingQuery::UnknownKey);
        };
        let airline_id = persisted_id(&airline, "airline")?;
        let flights = self
            .flights
            .read_all(Some(Filter::eq("airline_id", &airline_id)), "id")?;
        Ok(SightingQuery::Sightings(Box::new(flights.flat_map(
            move |flight| self.sightings_of_flight(flight, "date"),
        ))))
    }

    /// Sightings made at one location ordered by date.
    pub fn query_sightings_by_location(&self, location: &str) -> RepoResult<SightingQuery<'_>> {
        let Some(location) = self.locations.read("name", &location)? else {
            return Ok(SightingQuery::UnknownKey);
        };
        let location_id = persisted_id(&location, "location")?;
        let sightings = self
            .sightings
            .read_all(Some(Filter::eq("location_id", &location_id)), "date")?;
        Ok(SightingQuery::Sightings(sightings))
    }

    /// Sightings made on any day from `from` through `to`, ordered by date.
    ///
    /// Dates are never an unknown key; an inverted range yields nothing.
    pub fn query_sightings_by_date(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<SightingQuery<'_>> {
        let start = from.and_time(NaiveTime::MIN);
        let end = to
            .succ_opt()
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN);
        let sightings = self.sightings.read_between(start, end)?;
        Ok(SightingQuery::Sightings(sightings))
    }

    fn sightings_of_flight(
        &self,
        flight: RepoResult<Flight>,
        order_by: &'static str,
    ) -> EntityIter<'_, Sighting> {
        let sightings = flight.and_then(|flight| {
            let flight_id = persisted_id(&flight, "flight")?;
            self.sightings
                .read_all(Some(Filter::eq("flight_id", &flight_id)), order_by)
        });
        match sightings {
            Ok(sightings) => sightings,
            Err(err) => Box::new(std::iter::once(Err(err))),
        }
    }
}

//! Sighting aggregate root.

use crate::model::aircraft::Aircraft;
use crate::model::entity::{EntityId, EntityValidationError, Persisted};
use crate::model::flight::Flight;
use crate::model::named::Location;
use chrono::NaiveDateTime;
use serde::Serialize;

/// One observation of an aircraft operating a flight.
///
/// Owns fully resolved copies of the location, flight and aircraft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sighting {
    id: Option<EntityId>,
    altitude: i64,
    date: NaiveDateTime,
    location: Location,
    flight: Flight,
    aircraft: Aircraft,
}

impl Sighting {
    pub fn new(
        altitude: i64,
        date: NaiveDateTime,
        location: Location,
        flight: Flight,
        aircraft: Aircraft,
    ) -> Result<Self, EntityValidationError> {
        Self::from_parts(altitude, date, location, flight, aircraft, None)
    }

    pub fn with_id(
        altitude: i64,
        date: NaiveDateTime,
        location: Location,
        flight: Flight,
        aircraft: Aircraft,
        id: EntityId,
    ) -> Result<Self, EntityValidationError> {
        Self::from_parts(altitude, date, location, flight, aircraft, Some(id))
    }

    pub fn validate_altitude(altitude: i64) -> Result<(), EntityValidationError> {
        if altitude < 0 {
            return Err(EntityValidationError::new(
                "altitude",
                format!("must be 0 or greater: supplied {altitude}"),
            ));
        }
        Ok(())
    }

    pub(crate) fn from_parts(
        altitude: i64,
        date: NaiveDateTime,
        location: Location,
        flight: Flight,
        aircraft: Aircraft,
        id: Option<EntityId>,
    ) -> Result<Self, EntityValidationError> {
        Self::validate_altitude(altitude)?;
        Ok(Self {
            id,
            altitude,
            date,
            location,
            flight,
            aircraft,
        })
    }

    /// Altitude in feet.
    pub fn altitude(&self) -> i64 {
        self.altitude
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn flight(&self) -> &Flight {
        &self.flight
    }

    pub fn aircraft(&self) -> &Aircraft {
        &self.aircraft
    }
}

impl Persisted for Sighting {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

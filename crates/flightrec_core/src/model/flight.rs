//! Flight entity.
//!
//! # Invariants
//! - `embarkation` and `destination` are exactly three uppercase ASCII
//!   letters, or the literal `N/A`.

use crate::model::entity::{EntityId, EntityValidationError, Persisted};
use crate::model::named::Airline;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Placeholder used when an airport is unknown.
pub const AIRPORT_NOT_APPLICABLE: &str = "N/A";

static AIRPORT_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid airport code regex"));

/// Scheduled flight operated by an airline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flight {
    id: Option<EntityId>,
    number: String,
    embarkation: String,
    destination: String,
    airline: Airline,
}

impl Flight {
    pub fn new(
        number: impl Into<String>,
        embarkation: impl Into<String>,
        destination: impl Into<String>,
        airline: Airline,
    ) -> Result<Self, EntityValidationError> {
        Self::from_parts(
            number.into(),
            embarkation.into(),
            destination.into(),
            airline,
            None,
        )
    }

    pub fn with_id(
        number: impl Into<String>,
        embarkation: impl Into<String>,
        destination: impl Into<String>,
        airline: Airline,
        id: EntityId,
    ) -> Result<Self, EntityValidationError> {
        Self::from_parts(
            number.into(),
            embarkation.into(),
            destination.into(),
            airline,
            Some(id),
        )
    }

    /// Validates both airport codes of a route.
    pub fn validate_route(embarkation: &str, destination: &str) -> Result<(), EntityValidationError> {
        validate_airport_code("embarkation", embarkation)?;
        validate_airport_code("destination", destination)
    }

    pub(crate) fn from_parts(
        number: String,
        embarkation: String,
        destination: String,
        airline: Airline,
        id: Option<EntityId>,
    ) -> Result<Self, EntityValidationError> {
        Self::validate_route(&embarkation, &destination)?;
        Ok(Self {
            id,
            number,
            embarkation,
            destination,
            airline,
        })
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn embarkation(&self) -> &str {
        &self.embarkation
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn airline(&self) -> &Airline {
        &self.airline
    }
}

impl Persisted for Flight {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

fn validate_airport_code(field: &'static str, code: &str) -> Result<(), EntityValidationError> {
    if code == AIRPORT_NOT_APPLICABLE || AIRPORT_CODE_RE.is_match(code) {
        return Ok(());
    }
    Err(EntityValidationError::new(
        field,
        format!("invalid airport code `{code}`; expected 3 uppercase letters or {AIRPORT_NOT_APPLICABLE}"),
    ))
}

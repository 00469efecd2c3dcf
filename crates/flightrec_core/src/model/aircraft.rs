//! Aircraft entity.
//!
//! # Invariants
//! - `registration` and `serial_number` are never empty.
//! - `manufactured` lies in `[EARLIEST_YEAR_OF_MANUFACTURE, current year]`.
//! - `age` is captured once at construction and never recomputed.

use crate::model::aircraft_model::Model;
use crate::model::entity::{
    current_year, validate_non_empty, EntityId, EntityValidationError, Persisted,
};
use serde::Serialize;

/// Year of the first powered flight; nothing can be older.
pub const EARLIEST_YEAR_OF_MANUFACTURE: i32 = 1903;

/// Individual airframe identified by its registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aircraft {
    id: Option<EntityId>,
    registration: String,
    serial_number: String,
    manufactured: i32,
    age: i32,
    model: Model,
}

impl Aircraft {
    pub fn new(
        registration: impl Into<String>,
        serial_number: impl Into<String>,
        manufactured: i32,
        model: Model,
    ) -> Result<Self, EntityValidationError> {
        Self::from_parts(
            registration.into(),
            serial_number.into(),
            manufactured,
            model,
            None,
        )
    }

    pub fn with_id(
        registration: impl Into<String>,
        serial_number: impl Into<String>,
        manufactured: i32,
        model: Model,
        id: EntityId,
    ) -> Result<Self, EntityValidationError> {
        Self::from_parts(
            registration.into(),
            serial_number.into(),
            manufactured,
            model,
            Some(id),
        )
    }

    /// Validates scalar aircraft fields without needing a resolved model.
    ///
    /// Used by write paths to reject input before any row is inserted.
    pub fn validate_fields(
        registration: &str,
        serial_number: &str,
        manufactured: i32,
    ) -> Result<(), EntityValidationError> {
        let this_year = current_year();
        if !(EARLIEST_YEAR_OF_MANUFACTURE..=this_year).contains(&manufactured) {
            return Err(EntityValidationError::new(
                "manufactured",
                format!(
                    "year of manufacture must be between {EARLIEST_YEAR_OF_MANUFACTURE} and {this_year}: supplied {manufactured}"
                ),
            ));
        }
        validate_non_empty("registration", registration)?;
        validate_non_empty("serial_number", serial_number)?;
        Ok(())
    }

    pub(crate) fn from_parts(
        registration: String,
        serial_number: String,
        manufactured: i32,
        model: Model,
        id: Option<EntityId>,
    ) -> Result<Self, EntityValidationError> {
        Self::validate_fields(&registration, &serial_number, manufactured)?;
        Ok(Self {
            id,
            registration,
            serial_number,
            manufactured,
            age: current_year() - manufactured,
            model,
        })
    }

    pub fn registration(&self) -> &str {
        &self.registration
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    pub fn manufactured(&self) -> i32 {
        self.manufactured
    }

    /// Age in years as of construction time.
    pub fn age(&self) -> i32 {
        self.age
    }

    pub fn model(&self) -> &Model {
        &self.model
    }
}

impl Persisted for Aircraft {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

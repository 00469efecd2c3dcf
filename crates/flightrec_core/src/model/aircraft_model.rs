//! Aircraft model (type) entity, e.g. `A320-214` built by Airbus.

use crate::model::entity::{validate_non_empty, EntityId, EntityValidationError, Persisted};
use crate::model::named::Manufacturer;
use serde::Serialize;

/// Aircraft model owning its manufacturer by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Model {
    id: Option<EntityId>,
    name: String,
    manufacturer: Manufacturer,
}

impl Model {
    pub fn new(
        name: impl Into<String>,
        manufacturer: Manufacturer,
    ) -> Result<Self, EntityValidationError> {
        Self::from_parts(name.into(), manufacturer, None)
    }

    pub fn with_id(
        name: impl Into<String>,
        manufacturer: Manufacturer,
        id: EntityId,
    ) -> Result<Self, EntityValidationError> {
        Self::from_parts(name.into(), manufacturer, Some(id))
    }

    pub(crate) fn from_parts(
        name: String,
        manufacturer: Manufacturer,
        id: Option<EntityId>,
    ) -> Result<Self, EntityValidationError> {
        validate_non_empty("name", &name)?;
        Ok(Self {
            id,
            name,
            manufacturer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manufacturer(&self) -> &Manufacturer {
        &self.manufacturer
    }
}

impl Persisted for Model {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

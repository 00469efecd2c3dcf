//! Name-keyed reference entities: airlines, observation locations and
//! aircraft manufacturers.
//!
//! # Invariants
//! - `name` is never empty.
//! - Uniqueness by name is a repository concern, not enforced here.

use crate::model::entity::{validate_non_empty, EntityId, EntityValidationError, Persisted};
use serde::Serialize;

/// Common shape of entities identified by a single `name` column.
///
/// Lets one generic repository serve every name-keyed table.
pub trait NamedEntity: Persisted + Sized + 'static {
    /// Backing table name.
    const TABLE: &'static str;

    /// Constructs a validated entity from stored or user-provided values.
    fn from_parts(name: String, id: Option<EntityId>) -> Result<Self, EntityValidationError>;
}

macro_rules! named_entity {
    ($(#[$meta:meta])* $entity:ident, $table:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
        pub struct $entity {
            id: Option<EntityId>,
            name: String,
        }

        impl $entity {
            pub fn new(name: impl Into<String>) -> Result<Self, EntityValidationError> {
                Self::from_parts(name.into(), None)
            }

            pub fn with_id(
                name: impl Into<String>,
                id: EntityId,
            ) -> Result<Self, EntityValidationError> {
                Self::from_parts(name.into(), Some(id))
            }

            pub fn name(&self) -> &str {
                &self.name
            }
        }

        impl Persisted for $entity {
            fn id(&self) -> Option<EntityId> {
                self.id
            }
        }

        impl NamedEntity for $entity {
            const TABLE: &'static str = $table;

            fn from_parts(
                name: String,
                id: Option<EntityId>,
            ) -> Result<Self, EntityValidationError> {
                validate_non_empty("name", &name)?;
                Ok(Self { id, name })
            }
        }
    };
}

named_entity!(
    /// Airline operating a flight.
    Airline,
    "airline"
);

named_entity!(
    /// Place where a sighting was made.
    Location,
    "location"
);

named_entity!(
    /// Aircraft manufacturer.
    Manufacturer,
    "manufacturer"
);

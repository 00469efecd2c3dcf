//! Shared identity and validation primitives for all entities.

use chrono::{Datelike, Local};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Persisted row identity assigned by the store on insert.
pub type EntityId = i64;

/// Access to the persisted identity carried by every entity.
pub trait Persisted {
    /// Returns the row identity, or `None` for transient entities.
    fn id(&self) -> Option<EntityId>;
}

/// Entity construction failure.
///
/// There is a single error kind for every invariant; `field` names the
/// attribute that was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityValidationError {
    field: &'static str,
    message: String,
}

impl EntityValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// Name of the violated field, e.g. `manufactured`.
    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for EntityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid entity value for `{}`: {}", self.field, self.message)
    }
}

impl Error for EntityValidationError {}

/// Rejects empty text values.
pub fn validate_non_empty(field: &'static str, value: &str) -> Result<(), EntityValidationError> {
    if value.is_empty() {
        return Err(EntityValidationError::new(field, "cannot be empty"));
    }
    Ok(())
}

/// Current calendar year from the local clock.
pub fn current_year() -> i32 {
    Local::now().year()
}

#[cfg(test)]
mod tests {
    use super::{validate_non_empty, EntityValidationError};

    #[test]
    fn display_names_the_field() {
        let err = EntityValidationError::new("altitude", "must be 0 or greater");
        assert_eq!(
            err.to_string(),
            "invalid entity value for `altitude`: must be 0 or greater"
        );
    }

    #[test]
    fn empty_values_are_rejected() {
        let err = validate_non_empty("name", "").unwrap_err();
        assert_eq!(err.field(), "name");
        assert!(validate_non_empty("name", "Airbus").is_ok());
    }
}

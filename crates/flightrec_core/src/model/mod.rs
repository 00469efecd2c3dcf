//! Flight recorder entity model.
//!
//! # Responsibility
//! - Define the immutable value objects assembled by the repository layer.
//! - Validate every entity invariant at construction time.
//!
//! # Invariants
//! - Entities have no setters; all fields are fixed at construction.
//! - Identity is `None` until the entity has been read back from storage.
//! - Nothing in this module depends on storage.

pub mod aircraft;
pub mod aircraft_model;
pub mod entity;
pub mod flight;
pub mod named;
pub mod sighting;

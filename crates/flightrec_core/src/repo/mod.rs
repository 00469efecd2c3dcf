//! Repository layer over the flight recorder schema.
//!
//! # Responsibility
//! - Map entity tables to validated, fully resolved domain objects.
//! - Provide find-or-create writes that keep reference data unique.
//!
//! # Invariants
//! - Repositories borrow one migrated connection; they never open their own.
//! - Foreign keys are resolved through injected dependency repositories.
//! - Not-found is `Ok(None)`, never an error.

pub mod aircraft_repo;
pub mod base;
pub mod flight_repo;
pub mod model_repo;
pub mod named_repo;
pub mod sighting_repo;

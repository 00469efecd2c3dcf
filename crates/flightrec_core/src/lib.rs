//! Core of the flight recorder: a personal log of aircraft sightings.
//! Entities are validated on construction and persisted in SQLite.

pub mod config;
pub mod database;
pub mod db;
pub mod exchange;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{AppConfig, ConfigError};
pub use database::{FlightRecorderDatabase, SightingQuery};
pub use db::{open_db, open_db_in_memory, DbError};
pub use exchange::{export_csv, import_csv, ExchangeError, DATE_FORMAT};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::aircraft::Aircraft;
pub use model::aircraft_model::Model;
pub use model::entity::{EntityId, EntityValidationError, Persisted};
pub use model::flight::Flight;
pub use model::named::{Airline, Location, Manufacturer, NamedEntity};
pub use model::sighting::Sighting;
pub use repo::base::{EntityIter, Filter, RepoError, RepoResult};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

//! Bulk import and export of sightings as comma-separated records.
//!
//! # Responsibility
//! - Load flattened sighting records through the database façade.
//! - Write every stored sighting back out in the same layout.
//!
//! # Invariants
//! - The first record of an import is a header and is skipped.
//! - Imports are not atomic: records before a failing one stay stored.
//! - Exported ages are converted back to a year of manufacture on import.

mod record;

pub use record::{
    decode_record, encode_record, FlattenedSighting, COLUMN_TITLES, DATE_FORMAT,
};

use crate::database::FlightRecorderDatabase;
use crate::repo::base::{persisted_id, RepoError, RepoResult};
use crate::repo::sighting_repo::SightingRepository;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{BufRead, Write};
use std::time::Instant;

pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// Import/export failure.
#[derive(Debug)]
pub enum ExchangeError {
    Io(std::io::Error),
    Repo(RepoError),
    /// A record could not be parsed or failed validation.
    InvalidRecord { line: usize, message: String },
}

impl Display for ExchangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "exchange I/O error: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InvalidRecord { line, message } => {
                write!(f, "invalid record at line {line}: {message}")
            }
        }
    }
}

impl Error for ExchangeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InvalidRecord { .. } => None,
        }
    }
}

impl From<std::io::Error> for ExchangeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RepoError> for ExchangeError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Imports every data record from `reader` and returns how many were stored.
///
/// Each record create-or-gets its aircraft, flight and location, then always
/// appends a new sighting.
///
/// # Errors
/// - `InvalidRecord` for a malformed record or one rejected by validation,
///   with the line on which the record starts.
/// - `Io`/`Repo` for read and storage failures.
pub fn import_csv(reader: impl BufRead, db: &FlightRecorderDatabase<'_>) -> ExchangeResult<usize> {
    let started_at = Instant::now();
    info!("event=import module=exchange status=start");

    let result = import_records(reader, db);
    match &result {
        Ok(count) => info!(
            "event=import module=exchange status=ok records={count} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=import module=exchange status=error duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    result
}

/// Writes a header and one record per stored sighting, in identity order.
///
/// Returns the number of sightings written.
pub fn export_csv(
    mut writer: impl Write,
    db: &FlightRecorderDatabase<'_>,
) -> ExchangeResult<usize> {
    let started_at = Instant::now();
    info!("event=export module=exchange status=start");

    writeln!(writer, "{}", encode_record(&COLUMN_TITLES))?;
    let mut count = 0;
    for sighting in db.sighting_repo().read_all(None, "id")? {
        let sighting = sighting?;
        let record = FlattenedSighting::from_sighting(&sighting);
        writeln!(writer, "{}", encode_record(record.to_fields().as_slice()))?;
        count += 1;
    }
    writer.flush()?;

    info!(
        "event=export module=exchange status=ok records={count} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(count)
}

fn import_records(reader: impl BufRead, db: &FlightRecorderDatabase<'_>) -> ExchangeResult<usize> {
    let mut count = 0;
    let mut pending = String::new();
    let mut record_line = 0;
    let mut header_seen = false;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if pending.is_empty() {
            if line.trim().is_empty() {
                continue;
            }
            record_line = index + 1;
        } else {
            pending.push('\n');
        }
        pending.push_str(&line);

        let Some(fields) = decode_record(&pending) else {
            continue;
        };
        pending.clear();

        if !header_seen {
            header_seen = true;
            continue;
        }

        let record = FlattenedSighting::from_fields(&fields).map_err(|message| {
            ExchangeError::InvalidRecord {
                line: record_line,
                message,
            }
        })?;
        store_record(&record, db).map_err(|err| match err {
            RepoError::Validation(err) => ExchangeError::InvalidRecord {
                line: record_line,
                message: err.to_string(),
            },
            other => ExchangeError::Repo(other),
        })?;
        count += 1;
        debug!(
            "event=import module=exchange status=progress record={count} line={record_line}"
        );
    }

    if !pending.is_empty() {
        return Err(ExchangeError::InvalidRecord {
            line: record_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    Ok(count)
}

fn store_record(record: &FlattenedSighting, db: &FlightRecorderDatabase<'_>) -> RepoResult<()> {
    let aircraft = db.create_aircraft(
        &record.registration,
        &record.serial_number,
        record.manufactured(),
        &record.model,
        &record.manufacturer,
    )?;
    let flight = db.create_flight(
        &record.flight_number,
        &record.embarkation,
        &record.destination,
        &record.airline,
    )?;
    let location = db.create_location(&record.location)?;

    db.create_sighting(
        record.altitude,
        record.timestamp(),
        persisted_id(&location, "location")?,
        persisted_id(&flight, "flight")?,
        persisted_id(&aircraft, "aircraft")?,
    )?;
    Ok(())
}

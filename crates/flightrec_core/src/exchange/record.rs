//! Flat 12-column sighting record and its comma-separated line codec.
//!
//! # Invariants
//! - Column order always follows [`COLUMN_TITLES`].
//! - Fields containing a comma, a quote or a line break are quoted, with
//!   embedded quotes doubled.

use crate::model::entity::current_year;
use crate::model::sighting::Sighting;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Day-first date format used in exchange files.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

pub const COLUMN_TITLES: [&str; 12] = [
    "Flight",
    "Airline",
    "Registration",
    "Serial Number",
    "Manufacturer",
    "Type",
    "Age",
    "From",
    "To",
    "Height",
    "Date",
    "Location",
];

/// One sighting flattened to exchange columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedSighting {
    pub flight_number: String,
    pub airline: String,
    pub registration: String,
    pub serial_number: String,
    pub manufacturer: String,
    pub model: String,
    pub age: i32,
    pub embarkation: String,
    pub destination: String,
    pub altitude: i64,
    pub date: NaiveDate,
    pub location: String,
}

impl FlattenedSighting {
    pub fn from_sighting(sighting: &Sighting) -> Self {
        let flight = sighting.flight();
        let aircraft = sighting.aircraft();
        Self {
            flight_number: flight.number().to_string(),
            airline: flight.airline().name().to_string(),
            registration: aircraft.registration().to_string(),
            serial_number: aircraft.serial_number().to_string(),
            manufacturer: aircraft.model().manufacturer().name().to_string(),
            model: aircraft.model().name().to_string(),
            age: aircraft.age(),
            embarkation: flight.embarkation().to_string(),
            destination: flight.destination().to_string(),
            altitude: sighting.altitude(),
            date: sighting.date().date(),
            location: sighting.location().name().to_string(),
        }
    }

    /// Year of manufacture implied by `age` as of the current year.
    ///
    /// Saturates for ages no calendar year can satisfy; aircraft validation
    /// then rejects the year.
    pub fn manufactured(&self) -> i32 {
        current_year().saturating_sub(self.age)
    }

    /// Sighting timestamp at midnight of `date`.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN)
    }

    pub fn to_fields(&self) -> Vec<String> {
        vec![
            self.flight_number.clone(),
            self.airline.clone(),
            self.registration.clone(),
            self.serial_number.clone(),
            self.manufacturer.clone(),
            self.model.clone(),
            self.age.to_string(),
            self.embarkation.clone(),
            self.destination.clone(),
            self.altitude.to_string(),
            self.date.format(DATE_FORMAT).to_string(),
            self.location.clone(),
        ]
    }

    /// Parses one data record; the error is a human-readable reason.
    pub fn from_fields(fields: &[String]) -> Result<Self, String> {
        let [flight_number, airline, registration, serial_number, manufacturer, model, age, embarkation, destination, altitude, date, location] =
            fields
        else {
            return Err(format!(
                "expected {} fields, found {}",
                COLUMN_TITLES.len(),
                fields.len()
            ));
        };

        let age = age
            .trim()
            .parse::<i32>()
            .map_err(|err| format!("invalid age `{age}`: {err}"))
            .and_then(|age| match current_year().checked_sub(age) {
                Some(_) => Ok(age),
                None => Err(format!("age `{age}` is out of range")),
            })?;
        let altitude = altitude
            .trim()
            .parse::<i64>()
            .map_err(|err| format!("invalid height `{altitude}`: {err}"))?;
        let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
            .map_err(|err| format!("invalid date `{date}`: {err}"))?;

        Ok(Self {
            flight_number: flight_number.clone(),
            airline: airline.clone(),
            registration: registration.clone(),
            serial_number: serial_number.clone(),
            manufacturer: manufacturer.clone(),
            model: model.clone(),
            age,
            embarkation: embarkation.clone(),
            destination: destination.clone(),
            altitude,
            date,
            location: location.clone(),
        })
    }
}

/// Joins fields into one record line, without the terminator.
pub fn encode_record<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|field| quote_field(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Splits one record into fields.
///
/// Returns `None` while a quoted field is still open, so the caller can
/// append the next physical line and retry.
pub fn decode_record(text: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match (in_quotes, ch) {
            (true, '"') if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            (true, '"') => in_quotes = false,
            (true, other) => field.push(other),
            (false, '"') if field.is_empty() => in_quotes = true,
            (false, ',') => fields.push(std::mem::take(&mut field)),
            (false, other) => field.push(other),
        }
    }

    if in_quotes {
        return None;
    }
    fields.push(field);
    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::{decode_record, encode_record, FlattenedSighting, COLUMN_TITLES};

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn plain_fields_are_not_quoted() {
        assert_eq!(encode_record(&["EZY1234", "EasyJet", "G-EZAB"]), "EZY1234,EasyJet,G-EZAB");
    }

    #[test]
    fn fields_with_separators_or_quotes_are_quoted() {
        let line = encode_record(&["Boeing, Inc", "The \"Queen\""]);
        assert_eq!(line, "\"Boeing, Inc\",\"The \"\"Queen\"\"\"");
        assert_eq!(
            decode_record(&line).unwrap(),
            fields(&["Boeing, Inc", "The \"Queen\""])
        );
    }

    #[test]
    fn open_quote_requests_more_input() {
        assert!(decode_record("\"Runway 27,").is_none());
        assert_eq!(
            decode_record("\"Runway 27,\nWest\",x").unwrap(),
            fields(&["Runway 27,\nWest", "x"])
        );
    }

    #[test]
    fn empty_fields_are_preserved() {
        assert_eq!(decode_record(",,").unwrap(), fields(&["", "", ""]));
    }

    #[test]
    fn header_has_twelve_columns() {
        assert_eq!(COLUMN_TITLES.len(), 12);
        assert_eq!(COLUMN_TITLES[9], "Height");
    }

    #[test]
    fn from_fields_parses_numbers_and_day_first_dates() {
        let record = FlattenedSighting::from_fields(&fields(&[
            "BA123", "British Airways", "G-ABCD", "1234", "Airbus", "A320", "10", "LHR",
            "MAN", "35000", "02/03/2024", "Heathrow",
        ]))
        .unwrap();
        assert_eq!(record.age, 10);
        assert_eq!(record.altitude, 35000);
        assert_eq!(record.date.to_string(), "2024-03-02");
        assert_eq!(record.to_fields()[10], "02/03/2024");
    }

    #[test]
    fn from_fields_rejects_wrong_width_and_bad_values() {
        let short = FlattenedSighting::from_fields(&fields(&["BA123"])).unwrap_err();
        assert!(short.contains("expected 12 fields"));

        let bad_age = FlattenedSighting::from_fields(&fields(&[
            "BA123", "BA", "G-ABCD", "1234", "Airbus", "A320", "ten", "LHR", "MAN", "0",
            "02/03/2024", "Heathrow",
        ]))
        .unwrap_err();
        assert!(bad_age.contains("invalid age"));
    }

    #[test]
    fn extreme_negative_age_is_out_of_range() {
        let err = FlattenedSighting::from_fields(&fields(&[
            "BA123", "BA", "G-ABCD", "1234", "Airbus", "A320", "-2147483648", "LHR", "MAN",
            "0", "02/03/2024", "Heathrow",
        ]))
        .unwrap_err();
        assert!(err.contains("out of range"), "{err}");
    }
}

use chrono::{Datelike, Local};
use flightrec_core::db::open_db_in_memory;
use flightrec_core::exchange::COLUMN_TITLES;
use flightrec_core::repo::aircraft_repo::AircraftRepository;
use flightrec_core::repo::sighting_repo::SightingRepository;
use flightrec_core::{export_csv, import_csv, ExchangeError, FlightRecorderDatabase};
use std::io::Cursor;

const HEADER: &str =
    "Flight,Airline,Registration,Serial Number,Manufacturer,Type,Age,From,To,Height,Date,Location";

fn sample() -> String {
    [
        HEADER,
        "BA123,British Airways,G-EUPA,1082,Airbus,A319,20,LHR,MAN,3000,02/03/2024,Heathrow",
        "U2123,EasyJet,G-EZAB,2154,Airbus,A320,8,LGW,N/A,0,15/01/2024,\"Gatwick, South Terminal\"",
        "BA123,British Airways,G-EUPA,1082,Airbus,A319,20,LHR,MAN,2500,03/03/2024,Heathrow",
    ]
    .join("\n")
}

#[test]
fn header_matches_column_titles() {
    assert_eq!(COLUMN_TITLES.join(","), HEADER);
}

#[test]
fn import_creates_reference_data_once_and_every_sighting() {
    let conn = open_db_in_memory().unwrap();
    let db = FlightRecorderDatabase::try_new(&conn).unwrap();

    let count = import_csv(Cursor::new(sample()), &db).unwrap();
    assert_eq!(count, 3);

    let sightings = db
        .sighting_repo()
        .read_all(None, "id")
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(sightings.len(), 3);
    assert_eq!(sightings[1].location().name(), "Gatwick, South Terminal");
    assert_eq!(sightings[1].flight().destination(), "N/A");
    assert_eq!(sightings[0].date().format("%Y-%m-%d").to_string(), "2024-03-02");

    let aircraft = db
        .aircraft_repo()
        .read("registration", &"G-EUPA")
        .unwrap()
        .unwrap();
    assert_eq!(aircraft.manufactured(), Local::now().year() - 20);
    assert_eq!(aircraft.age(), 20);

    let aircraft_rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM aircraft;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(aircraft_rows, 2);
}

#[test]
fn export_then_import_into_fresh_store_reproduces_rows() {
    let source_conn = open_db_in_memory().unwrap();
    let source = FlightRecorderDatabase::try_new(&source_conn).unwrap();
    import_csv(Cursor::new(sample()), &source).unwrap();

    let mut exported = Vec::new();
    assert_eq!(export_csv(&mut exported, &source).unwrap(), 3);
    let exported = String::from_utf8(exported).unwrap();
    assert_eq!(exported.lines().next(), Some(HEADER));
    assert!(exported.contains("\"Gatwick, South Terminal\""));

    let target_conn = open_db_in_memory().unwrap();
    let target = FlightRecorderDatabase::try_new(&target_conn).unwrap();
    assert_eq!(import_csv(Cursor::new(exported.clone()), &target).unwrap(), 3);

    let mut reexported = Vec::new();
    export_csv(&mut reexported, &target).unwrap();
    assert_eq!(String::from_utf8(reexported).unwrap(), exported);
}

#[test]
fn export_of_empty_store_writes_only_the_header() {
    let conn = open_db_in_memory().unwrap();
    let db = FlightRecorderDatabase::try_new(&conn).unwrap();

    let mut out = Vec::new();
    assert_eq!(export_csv(&mut out, &db).unwrap(), 0);
    assert_eq!(String::from_utf8(out).unwrap(), format!("{HEADER}\n"));
}

#[test]
fn malformed_record_reports_its_line() {
    let conn = open_db_in_memory().unwrap();
    let db = FlightRecorderDatabase::try_new(&conn).unwrap();
    let text = [
        HEADER,
        "BA123,British Airways,G-EUPA,1082,Airbus,A319,20,LHR,MAN,3000,02/03/2024,Heathrow",
        "BA124,British Airways,G-EUPB,1083,Airbus,A319,20,LHR,MAN,3000,2024-03-02,Heathrow",
    ]
    .join("\n");

    match import_csv(Cursor::new(text), &db).unwrap_err() {
        ExchangeError::InvalidRecord { line, message } => {
            assert_eq!(line, 3);
            assert!(message.contains("invalid date"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    let stored = db.sighting_repo().read_all(None, "id").unwrap().count();
    assert_eq!(stored, 1);
}

#[test]
fn validation_failures_are_reported_as_invalid_records() {
    let conn = open_db_in_memory().unwrap();
    let db = FlightRecorderDatabase::try_new(&conn).unwrap();
    let text = [
        HEADER,
        "BA123,British Airways,G-EUPA,1082,Airbus,A319,20,LHR,MANC,3000,02/03/2024,Heathrow",
    ]
    .join("\n");

    match import_csv(Cursor::new(text), &db).unwrap_err() {
        ExchangeError::InvalidRecord { line, message } => {
            assert_eq!(line, 2);
            assert!(message.contains("destination"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn short_record_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let db = FlightRecorderDatabase::try_new(&conn).unwrap();
    let text = format!("{HEADER}\nBA123,British Airways\n");

    assert!(matches!(
        import_csv(Cursor::new(text), &db),
        Err(ExchangeError::InvalidRecord { line: 2, .. })
    ));
}

#[test]
fn overflowing_age_is_an_invalid_record() {
    let conn = open_db_in_memory().unwrap();
    let db = FlightRecorderDatabase::try_new(&conn).unwrap();
    let text = format!(
        "{HEADER}\nBA1,BA,G-ABCD,1,Airbus,A320,-2147483648,LHR,MAN,100,01/01/2024,Home\n"
    );

    match import_csv(Cursor::new(text), &db).unwrap_err() {
        ExchangeError::InvalidRecord { line, message } => {
            assert_eq!(line, 2);
            assert!(message.contains("age"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(db.sighting_repo().read_all(None, "id").unwrap().count(), 0);
}

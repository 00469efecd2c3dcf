use chrono::{Datelike, Local, NaiveDate};
use flightrec_core::model::aircraft::EARLIEST_YEAR_OF_MANUFACTURE;
use flightrec_core::model::flight::AIRPORT_NOT_APPLICABLE;
use flightrec_core::{
    Aircraft, Airline, Flight, Location, Manufacturer, Model, NamedEntity, Persisted, Sighting,
};

fn this_year() -> i32 {
    Local::now().year()
}

fn a320() -> Model {
    Model::new("A320", Manufacturer::new("Airbus").unwrap()).unwrap()
}

fn flight() -> Flight {
    Flight::new("U2123", "LGW", "AMS", Airline::new("EasyJet").unwrap()).unwrap()
}

#[test]
fn named_entities_reject_empty_names() {
    let err = Airline::new("").unwrap_err();
    assert_eq!(err.field(), "name");
    assert!(Location::new("").is_err());
    assert!(Manufacturer::new("").is_err());
    assert!(Model::new("", Manufacturer::new("Boeing").unwrap()).is_err());
}

#[test]
fn identity_is_fixed_by_constructor() {
    assert_eq!(Airline::new("KLM").unwrap().id(), None);
    assert_eq!(Airline::with_id("KLM", 7).unwrap().id(), Some(7));
}

#[test]
fn aircraft_year_of_manufacture_bounds() {
    let err = Aircraft::new("G-EZAB", "1234", 1800, a320()).unwrap_err();
    assert_eq!(err.field(), "manufactured");

    assert!(Aircraft::new("G-EZAB", "1234", EARLIEST_YEAR_OF_MANUFACTURE, a320()).is_ok());
    assert!(Aircraft::new("G-EZAB", "1234", this_year(), a320()).is_ok());
    assert!(Aircraft::new("G-EZAB", "1234", this_year() + 1, a320()).is_err());
}

#[test]
fn aircraft_rejects_empty_registration_and_serial() {
    assert_eq!(
        Aircraft::new("", "1234", 2010, a320()).unwrap_err().field(),
        "registration"
    );
    assert_eq!(
        Aircraft::new("G-EZAB", "", 2010, a320()).unwrap_err().field(),
        "serial_number"
    );
}

#[test]
fn aircraft_age_is_derived_from_year_of_manufacture() {
    let aircraft = Aircraft::new("G-EZAB", "1234", 2005, a320()).unwrap();
    assert_eq!(aircraft.manufactured(), 2005);
    assert_eq!(aircraft.age(), this_year() - 2005);
    assert_eq!(aircraft.model().manufacturer().name(), "Airbus");
}

#[test]
fn flight_airport_codes_must_be_three_uppercase_letters() {
    let airline = Airline::new("EasyJet").unwrap();
    for code in ["12", "MANC", "lhr", "LH1", ""] {
        let err = Flight::new("U2123", code, "AMS", airline.clone()).unwrap_err();
        assert_eq!(err.field(), "embarkation", "code `{code}`");
        let err = Flight::new("U2123", "AMS", code, airline.clone()).unwrap_err();
        assert_eq!(err.field(), "destination", "code `{code}`");
    }
}

#[test]
fn flight_accepts_not_applicable_airports() {
    let flight = Flight::new(
        "U2123",
        AIRPORT_NOT_APPLICABLE,
        "MAN",
        Airline::new("EasyJet").unwrap(),
    )
    .unwrap();
    assert_eq!(flight.embarkation(), "N/A");
    assert_eq!(flight.destination(), "MAN");
}

#[test]
fn sighting_altitude_cannot_be_negative() {
    let date = NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap();
    let aircraft = Aircraft::new("G-EZAB", "1234", 2010, a320()).unwrap();
    let location = Location::new("Gatwick").unwrap();

    let err = Sighting::new(-1, date, location.clone(), flight(), aircraft.clone()).unwrap_err();
    assert_eq!(err.field(), "altitude");

    let sighting = Sighting::new(0, date, location, flight(), aircraft).unwrap();
    assert_eq!(sighting.altitude(), 0);
    assert_eq!(sighting.date(), date);
}

#[test]
fn entities_serialize_with_nested_references() {
    let aircraft = Aircraft::with_id("G-EZAB", "1234", 2010, a320(), 3).unwrap();
    let value = serde_json::to_value(&aircraft).unwrap();

    assert_eq!(value["id"], 3);
    assert_eq!(value["registration"], "G-EZAB");
    assert_eq!(value["model"]["manufacturer"]["name"], "Airbus");
}

fn check_named<E: NamedEntity + std::fmt::Debug>(table: &str) {
    assert_eq!(E::TABLE, table);
    assert!(E::from_parts(String::new(), None).is_err());
    let stored = E::from_parts("Heathrow".to_string(), Some(3)).unwrap();
    assert_eq!(stored.id(), Some(3));
}

#[test]
fn named_entities_share_validation_and_tables() {
    check_named::<Airline>("airline");
    check_named::<Location>("location");
    check_named::<Manufacturer>("manufacturer");
    assert_eq!(Location::with_id("Heathrow", 3).unwrap().name(), "Heathrow");
}

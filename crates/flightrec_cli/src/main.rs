//! Command-line front end for the flight recorder store.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the store.
//! - Run one command per invocation and report failures on stderr.

use flightrec_core::{
    core_version, default_log_level, export_csv, import_csv, init_logging, open_db, ping,
    AppConfig, FlightRecorderDatabase, Sighting, SightingQuery, DATE_FORMAT,
};
use log::error;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::process::ExitCode;

const USAGE: &str =
    "usage: flightrec_cli [--config <file>] <ping | import <csv> | export <csv> | aircraft <registration>>";

enum Command {
    Ping,
    Import(String),
    Export(String),
    Aircraft(String),
}

struct Invocation {
    config: Option<String>,
    command: Command,
}

fn main() -> ExitCode {
    let invocation = match parse_args(std::env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(message) => {
            eprintln!("{message}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(invocation) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli module=cli status=error error={message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Invocation, String> {
    let mut config = None;
    let mut first = args.next();
    if first.as_deref() == Some("--config") {
        config = Some(args.next().ok_or("--config requires a file")?);
        first = args.next();
    }

    let command = match first.as_deref() {
        Some("ping") => Command::Ping,
        Some("import") => Command::Import(args.next().ok_or("import requires a csv file")?),
        Some("export") => Command::Export(args.next().ok_or("export requires a csv file")?),
        Some("aircraft") => {
            Command::Aircraft(args.next().ok_or("aircraft requires a registration")?)
        }
        Some(other) => return Err(format!("unknown command `{other}`")),
        None => return Err("missing command".to_string()),
    };
    if let Some(extra) = args.next() {
        return Err(format!("unexpected argument `{extra}`"));
    }

    Ok(Invocation { config, command })
}

fn run(invocation: Invocation) -> Result<(), String> {
    if let Command::Ping = invocation.command {
        println!("flightrec_core ping={}", ping());
        println!("flightrec_core version={}", core_version());
        return Ok(());
    }

    let config = match &invocation.config {
        Some(path) => AppConfig::load(path).map_err(|err| err.to_string())?,
        None => AppConfig::default(),
    };
    if let Some(dir) = &config.logging.dir {
        let level = config
            .logging
            .level
            .as_deref()
            .unwrap_or_else(|| default_log_level());
        init_logging(level, &dir.to_string_lossy())?;
    }

    let conn = open_db(config.database_file()).map_err(|err| err.to_string())?;
    let db = FlightRecorderDatabase::try_new(&conn).map_err(|err| err.to_string())?;

    match invocation.command {
        Command::Ping => Ok(()),
        Command::Import(path) => {
            let file = File::open(&path).map_err(|err| format!("cannot open `{path}`: {err}"))?;
            let count = import_csv(BufReader::new(file), &db).map_err(|err| err.to_string())?;
            println!("imported {count} sightings from {path}");
            Ok(())
        }
        Command::Export(path) => {
            let file =
                File::create(&path).map_err(|err| format!("cannot create `{path}`: {err}"))?;
            let count = export_csv(BufWriter::new(file), &db).map_err(|err| err.to_string())?;
            println!("exported {count} sightings to {path}");
            Ok(())
        }
        Command::Aircraft(registration) => print_aircraft_sightings(&db, &registration),
    }
}

fn print_aircraft_sightings(db: &FlightRecorderDatabase<'_>, registration: &str) -> Result<(), String> {
    let query = db
        .query_sightings_by_aircraft(registration)
        .map_err(|err| err.to_string())?;
    let SightingQuery::Sightings(sightings) = query else {
        println!("no aircraft with registration {registration}");
        return Ok(());
    };

    for sighting in sightings {
        let sighting = sighting.map_err(|err| err.to_string())?;
        println!("{}", sighting_line(&sighting));
    }
    Ok(())
}

fn sighting_line(sighting: &Sighting) -> String {
    let flight = sighting.flight();
    format!(
        "{} {} {}-{} {} {}ft at {}",
        sighting.date().format(DATE_FORMAT),
        flight.number(),
        flight.embarkation(),
        flight.destination(),
        flight.airline().name(),
        sighting.altitude(),
        sighting.location().name()
    )
}

#[cfg(test)]
mod tests {
    use super::{parse_args, sighting_line, Command};
    use flightrec_core::{import_csv, open_db_in_memory, FlightRecorderDatabase};
    use std::io::Cursor;

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_command_with_config() {
        let invocation = parse_args(args(&["--config", "fr.toml", "export", "out.csv"])).unwrap();
        assert_eq!(invocation.config.as_deref(), Some("fr.toml"));
        assert!(matches!(invocation.command, Command::Export(path) if path == "out.csv"));
    }

    #[test]
    fn rejects_missing_and_extra_arguments() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["import"])).is_err());
        assert!(parse_args(args(&["ping", "again"])).is_err());
    }

    #[test]
    fn sighting_lines_use_exchange_date_format() {
        let conn = open_db_in_memory().unwrap();
        let db = FlightRecorderDatabase::try_new(&conn).unwrap();
        let text = "Flight,Airline,Registration,Serial Number,Manufacturer,Type,Age,From,To,Height,Date,Location\n\
                    BA123,British Airways,G-EUPA,1082,Airbus,A319,20,LHR,MAN,3000,02/03/2024,Heathrow\n";
        import_csv(Cursor::new(text), &db).unwrap();

        let sighting = db
            .query_sightings_by_aircraft("G-EUPA")
            .unwrap()
            .into_iter()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(
            sighting_line(&sighting),
            "02/03/2024 BA123 LHR-MAN British Airways 3000ft at Heathrow"
        );
    }
}

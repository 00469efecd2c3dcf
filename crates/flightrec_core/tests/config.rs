use flightrec_core::{AppConfig, ConfigError};
use std::path::Path;

#[test]
fn relative_paths_resolve_against_base_dir() {
    let config = AppConfig::from_toml_str(
        r#"
[database]
path = "data"
filename = "sightings.db"

[logging]
level = "info"
dir = "logs"
"#,
        Path::new("/etc/flightrecorder"),
    )
    .unwrap();

    assert_eq!(
        config.database_file(),
        Path::new("/etc/flightrecorder/data/sightings.db")
    );
    assert_eq!(config.logging.level.as_deref(), Some("info"));
    assert_eq!(
        config.logging.dir.as_deref(),
        Some(Path::new("/etc/flightrecorder/logs"))
    );
}

#[test]
fn absolute_paths_are_kept_and_sections_default() {
    let config = AppConfig::from_toml_str(
        "[database]\npath = \"/srv/flights\"\n",
        Path::new("/etc/flightrecorder"),
    )
    .unwrap();

    assert_eq!(
        config.database_file(),
        Path::new("/srv/flights/flightrecorder.db")
    );
    assert_eq!(config.logging.level, None);
    assert_eq!(config.logging.dir, None);
}

#[test]
fn empty_or_nested_filename_is_invalid() {
    for text in [
        "[database]\nfilename = \"\"\n",
        "[database]\nfilename = \"nested/store.db\"\n",
    ] {
        let err = AppConfig::from_toml_str(text, Path::new("/tmp")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = AppConfig::from_toml_str("[database\npath = 1", Path::new("/tmp")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_reads_file_relative_to_its_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flightrecorder.toml");
    std::fs::write(&path, "[database]\npath = \"store\"\n").unwrap();

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(
        config.database_file(),
        dir.path().join("store").join("flightrecorder.db")
    );
}

#[test]
fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = AppConfig::load(dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

//! Application configuration loaded from TOML.
//!
//! # Invariants
//! - Relative paths are resolved against the directory of the config file.
//! - `database.filename` is a bare file name, never a path.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_DATABASE_FILENAME: &str = "flightrecorder.db";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    /// Parsed values are unusable.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Directory holding the store file.
    pub path: PathBuf,
    pub filename: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            filename: DEFAULT_DATABASE_FILENAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `trace|debug|info|warn|error`; build-mode default when absent.
    pub level: Option<String>,
    /// File logging is disabled when absent.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reads and resolves the config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let base_dir = if base_dir.is_absolute() {
            base_dir
        } else {
            std::env::current_dir()
                .map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?
                .join(base_dir)
        };
        Self::from_toml_str(&text, &base_dir)
    }

    /// Parses TOML text, resolving relative paths against `base_dir`.
    pub fn from_toml_str(text: &str, base_dir: &Path) -> ConfigResult<Self> {
        let mut config: Self = toml::from_str(text)?;
        config.validate()?;

        config.database.path = resolve(base_dir, &config.database.path);
        config.logging.dir = config.logging.dir.map(|dir| resolve(base_dir, &dir));
        Ok(config)
    }

    /// Full path of the store file.
    pub fn database_file(&self) -> PathBuf {
        self.database.path.join(&self.database.filename)
    }

    fn validate(&self) -> ConfigResult<()> {
        let filename = self.database.filename.trim();
        if filename.is_empty() {
            return Err(ConfigError::Invalid(
                "database.filename cannot be empty".to_string(),
            ));
        }
        if filename.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "database.filename must be a file name, got `{filename}`"
            )));
        }
        if let Some(level) = &self.logging.level {
            if level.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "logging.level cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

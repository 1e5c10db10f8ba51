//! # Service Configuration
//!
//! The service reads a YAML file (by default `config/config.yaml`) and then
//! applies environment overrides. Command-line flags are applied last by the
//! `serve` command.
//!
//! ```yaml
//! http:
//!   addr: 0.0.0.0:8080
//!   metrics: true
//! database:
//!   path: pets.db
//!   busy_timeout_ms: 5000
//!   read_only: true
//! ```
//!
//! Every key is optional; missing keys fall back to the defaults shown above.
//!
//! | Variable | Overrides |
//! |---|---|
//! | `PET_LOOKUP_ADDR` | `http.addr` |
//! | `PET_LOOKUP_DATABASE` | `database.path` |

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ADDR_ENV: &str = "PET_LOOKUP_ADDR";
pub const DATABASE_ENV: &str = "PET_LOOKUP_DATABASE";

/// Location probed when `serve` is started without `--config`.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Socket address to bind, e.g. `0.0.0.0:8080`
    pub addr: String,
    /// Serve `/metrics` and collect request counters
    pub metrics: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            metrics: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file. The schema is owned by whoever migrates it.
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
    /// Open the database read-only. The lookup never writes.
    pub read_only: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("pets.db"),
            busy_timeout_ms: 5_000,
            read_only: true,
        }
    }
}

impl AppConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(source: &str, origin: &Path) -> Result<Self, ConfigError> {
        // An empty file deserializes to `null`, which is not a mapping.
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read and parse a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&source, path)
    }

    /// Load the explicit file if given, otherwise [`DEFAULT_CONFIG_PATH`] when it
    /// exists, otherwise the built-in defaults. Environment overrides are applied
    /// in every case.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    tracing::debug!(
                        path = DEFAULT_CONFIG_PATH,
                        "No config file found, using defaults"
                    );
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `PET_LOOKUP_*` overrides using the given lookup function.
    ///
    /// Takes a closure rather than reading the process environment directly so
    /// tests do not have to mutate global state.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ADDR_ENV).filter(|v| !v.trim().is_empty()) {
            self.http.addr = addr;
        }
        if let Some(path) = lookup(DATABASE_ENV).filter(|v| !v.trim().is_empty()) {
            self.database.path = PathBuf::from(path);
        }
    }
}

//! Structured logging setup.
//!
//! One `tracing` subscriber for the process: an [`EnvFilter`] built from
//! `RUST_LOG` (or the configured level), plus a JSON or pretty fmt layer that
//! optionally writes through a `tracing_appender` non-blocking worker.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `PET_LOOKUP_LOG_LEVEL` | `info` |
//! | `PET_LOOKUP_LOG_FORMAT` | `json` (`pretty` for humans) |
//! | `PET_LOOKUP_LOG_ASYNC` | `true` |
//! | `PET_LOOKUP_LOG_TARGET_FILTER` | unset, comma-separated directives |
//! | `PET_LOOKUP_LOG_INCLUDE_LOCATION` | `false` |

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const LOG_LEVEL_ENV: &str = "PET_LOOKUP_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "PET_LOOKUP_LOG_FORMAT";
pub const LOG_ASYNC_ENV: &str = "PET_LOOKUP_LOG_ASYNC";
pub const LOG_TARGET_FILTER_ENV: &str = "PET_LOOKUP_LOG_TARGET_FILTER";
pub const LOG_INCLUDE_LOCATION_ENV: &str = "PET_LOOKUP_LOG_INCLUDE_LOCATION";

/// JSON for production, pretty-print for development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub log_level: String,
    pub format: LogFormat,
    pub async_logging: bool,
    /// Extra `EnvFilter` directives, comma-separated
    pub target_filter: Option<String>,
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            async_logging: true,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Read the `PET_LOOKUP_LOG_*` variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`LogConfig::from_env`] with an injectable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };
        Self {
            log_level: lookup(LOG_LEVEL_ENV).unwrap_or(defaults.log_level),
            format: lookup(LOG_FORMAT_ENV)
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.format),
            async_logging: flag(LOG_ASYNC_ENV, defaults.async_logging),
            target_filter: lookup(LOG_TARGET_FILTER_ENV).filter(|s| !s.trim().is_empty()),
            include_location: flag(LOG_INCLUDE_LOCATION_ENV, defaults.include_location),
        }
    }

    /// Level used when `RUST_LOG` is not set. Unknown names mean `info`.
    #[must_use]
    pub fn level(&self) -> Level {
        match self.log_level.trim().to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));

    // Accept-loop chatter from may_minihttp is noise below warn.
    if let Ok(directive) = "may_minihttp=warn".parse() {
        filter = filter.add_directive(directive);
    }

    if let Some(target_filter) = &config.target_filter {
        for directive in target_filter.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(_) => eprintln!("Warning: invalid log filter directive: {directive}"),
            }
        }
    }
    filter
}

/// Install the global subscriber.
///
/// With async logging enabled the returned guard owns the background writer;
/// keep it alive until shutdown so buffered events are flushed.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let (writer, guard) = if config.async_logging {
        let (nb, guard) = tracing_appender::non_blocking(std::io::stdout());
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(nb), Some(guard))
    } else {
        (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout),
            None,
        )
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        assert_eq!(LogConfig::from_lookup(lookup(&[])), LogConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = LogConfig::from_lookup(lookup(&[
            (LOG_LEVEL_ENV, "debug"),
            (LOG_FORMAT_ENV, "Pretty"),
            (LOG_ASYNC_ENV, "false"),
            (LOG_TARGET_FILTER_ENV, "rusqlite=warn"),
            (LOG_INCLUDE_LOCATION_ENV, "true"),
        ]));
        assert_eq!(config.level(), Level::DEBUG);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(!config.async_logging);
        assert_eq!(config.target_filter.as_deref(), Some("rusqlite=warn"));
        assert!(config.include_location);
    }

    #[test]
    fn test_garbage_values_fall_back() {
        let config = LogConfig::from_lookup(lookup(&[
            (LOG_LEVEL_ENV, "loud"),
            (LOG_FORMAT_ENV, "xml"),
            (LOG_ASYNC_ENV, "maybe"),
            (LOG_TARGET_FILTER_ENV, "  "),
        ]));
        assert_eq!(config.level(), Level::INFO);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.async_logging);
        assert_eq!(config.target_filter, None);
    }
}

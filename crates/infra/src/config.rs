//! Process configuration from environment variables.
//!
//! | variable | default | meaning |
//! |---|---|---|
//! | `AQUA_DATABASE_URL` | none | Postgres URL for [`PgSession`](crate::session::PgSession) |
//! | `AQUA_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `RUST_LOG` | `info` | tracing filter directives |

use aqua_observability::LogFormat;
use thiserror::Error;

pub const DATABASE_URL: &str = "AQUA_DATABASE_URL";
pub const LOG_FORMAT: &str = "AQUA_LOG_FORMAT";
pub const LOG_FILTER: &str = "RUST_LOG";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{variable} has invalid value {value:?}")]
    Invalid { variable: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AquaConfig {
    pub database_url: Option<String>,
    pub log_format: LogFormat,
    pub log_filter: String,
}

impl Default for AquaConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            log_format: LogFormat::Json,
            log_filter: "info".to_string(),
        }
    }
}

impl AquaConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_url = lookup(DATABASE_URL).filter(|url| !url.trim().is_empty());

        let log_format = match lookup(LOG_FORMAT) {
            None => defaults.log_format,
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                variable: LOG_FORMAT,
                value,
            })?,
        };

        let log_filter = lookup(LOG_FILTER)
            .filter(|filter| !filter.trim().is_empty())
            .unwrap_or(defaults.log_filter);

        Ok(Self {
            database_url,
            log_format,
            log_filter,
        })
    }

    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing(DATABASE_URL))
    }

    /// Install the tracing subscriber described by this configuration.
    ///
    /// `false` when a subscriber was already installed.
    pub fn init_observability(&self) -> bool {
        aqua_observability::init_with(self.log_format, &self.log_filter)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AquaConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AquaConfig::default());
        assert_eq!(
            config.require_database_url(),
            Err(ConfigError::Missing(DATABASE_URL))
        );
    }

    #[test]
    fn reads_all_variables() {
        let config = AquaConfig::from_lookup(lookup(&[
            (DATABASE_URL, "postgres://localhost/aqua"),
            (LOG_FORMAT, "pretty"),
            (LOG_FILTER, "aqua=debug"),
        ]))
        .unwrap();

        assert_eq!(config.require_database_url(), Ok("postgres://localhost/aqua"));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.log_filter, "aqua=debug");
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = AquaConfig::from_lookup(lookup(&[(LOG_FORMAT, "xml")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                variable: LOG_FORMAT,
                value: "xml".to_string()
            }
        );
    }
}

//! Server configuration read from the environment.
//!
//! - `PORT`: listen port (default 8080)
//! - `APP_DATA_PATH`: JSON data file (default `data/habits.json`)
//! - `SESSION_TTL_DAYS`: session lifetime in days (default 30)
//! - `COOKIE_SECURE`: `true`/`1` marks the session cookie `Secure`

use std::{env, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/habits.json";
const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub session_ttl_days: i64,
    pub cookie_secure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
            cookie_secure: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);
        let data_path = lookup("APP_DATA_PATH")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);
        let session_ttl_days = match parse_var::<i64>(&lookup, "SESSION_TTL_DAYS")? {
            Some(days) if days <= 0 => {
                return Err(ConfigError::Invalid {
                    name: "SESSION_TTL_DAYS",
                    value: days.to_string(),
                });
            }
            Some(days) => days,
            None => defaults.session_ttl_days,
        };
        let cookie_secure = lookup("COOKIE_SECURE")
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.cookie_secure);

        Ok(Self {
            port,
            data_path,
            session_ttl_days,
            cookie_secure,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

//! Environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use souffleur_director::domain::credential::DirectorPassword;
use souffleur_sync::SyncSchedule;
use souffleur_sync::schedule::{DEFAULT_HOUR, DEFAULT_MINUTE};

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

/// Server configuration read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Shared secret for director claims.
    pub director_password: DirectorPassword,
    /// Daily repository pull.
    pub sync: SyncSchedule,
    /// Lowers the default log level to `debug`.
    pub debug: bool,
}

impl Config {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a variable is missing or invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when `DIRECTOR_PASSWORD` is unset or
    /// empty, or when a numeric variable does not parse or is out of range.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let director_password = lookup("DIRECTOR_PASSWORD")
            .filter(|value| !value.is_empty())
            .map(DirectorPassword::new)
            .ok_or_else(|| AppError::Config("DIRECTOR_PASSWORD must be set".into()))?;

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_number(&lookup, "PORT", DEFAULT_PORT)?;

        let enabled = lookup("ENABLE_DAILY_GIT_PULL").is_none_or(|value| is_truthy(&value));
        let hour = parse_number(&lookup, "GIT_PULL_DAILY_HOUR", DEFAULT_HOUR)?;
        let minute = parse_number(&lookup, "GIT_PULL_DAILY_MINUTE", DEFAULT_MINUTE)?;
        let repo_dir =
            lookup("GIT_PULL_REPO_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from);
        let sync = SyncSchedule::daily_at(enabled, hour, minute, repo_dir)
            .map_err(|e| AppError::Config(e.to_string()))?;

        let debug = lookup("DEBUG")
            .or_else(|| lookup("FLASK_DEBUG"))
            .is_some_and(|value| is_truthy(&value));

        Ok(Self {
            host,
            port,
            director_password,
            sync,
            debug,
        })
    }

    /// Socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when `host` is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn parse_number<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be a number: {e}"))),
        None => Ok(default),
    }
}

// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "text" | "pretty" => Ok(LogFormat::Text),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}': expected text or json", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Further ports tried (`port + 1`, `port + 2`, ...) when the address is taken.
  pub port_retries: u16,
  pub database_path: PathBuf,
  pub seed_db: bool,
  pub session_ttl_hours: i64,
  pub log_format: LogFormat,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 3000,
      port_retries: 5,
      database_path: PathBuf::from("data/app.sqlite"),
      seed_db: true,
      session_ttl_hours: 168,
      log_format: LogFormat::Text,
    }
  }
}

fn parse_var<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    Some(value) if !value.trim().is_empty() => value
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
    _ => Ok(default),
  }
}

impl AppConfig {
  /// Loads `.env` when present, then reads the process environment.
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    let config = Self::from_lookup(|name| env::var(name).ok())?;
    Ok(config)
  }

  /// Builds the configuration from an arbitrary variable source. Unset or
  /// blank variables take their defaults.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let defaults = Self::default();

    let server_host = lookup("SERVER_HOST")
      .filter(|h| !h.trim().is_empty())
      .unwrap_or(defaults.server_host);
    let server_port = parse_var("SERVER_PORT", lookup("SERVER_PORT"), defaults.server_port)?;
    let port_retries = parse_var("PORT_RETRIES", lookup("PORT_RETRIES"), defaults.port_retries)?;
    let database_path = lookup("DATABASE_PATH")
      .filter(|p| !p.trim().is_empty())
      .map(PathBuf::from)
      .unwrap_or(defaults.database_path);
    let seed_db = parse_var("SEED_DB", lookup("SEED_DB"), defaults.seed_db)?;
    let session_ttl_hours = parse_var("SESSION_TTL_HOURS", lookup("SESSION_TTL_HOURS"), defaults.session_ttl_hours)?;
    let log_format = parse_var("LOG_FORMAT", lookup("LOG_FORMAT"), defaults.log_format)?;

    let config = Self {
      server_host,
      server_port,
      port_retries,
      database_path,
      seed_db,
      session_ttl_hours,
      log_format,
    };
    config.session_ttl()?;
    Ok(config)
  }

  /// Session lifetime; positive and small enough to do date arithmetic with.
  pub fn session_ttl(&self) -> Result<chrono::Duration> {
    chrono::Duration::try_hours(self.session_ttl_hours)
      .filter(|ttl| *ttl > chrono::Duration::zero())
      .ok_or_else(|| {
        AppError::Config(format!(
          "SESSION_TTL_HOURS must be a positive number of hours, got {}",
          self.session_ttl_hours
        ))
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| vars.get(name).cloned()
  }

  #[test]
  fn defaults_apply_when_nothing_is_set() {
    let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(config.server_port, 3000);
    assert_eq!(config.port_retries, 5);
    assert_eq!(config.database_path, PathBuf::from("data/app.sqlite"));
    assert!(config.seed_db);
    assert_eq!(config.session_ttl_hours, 168);
    assert_eq!(config.log_format, LogFormat::Text);
  }

  #[test]
  fn values_are_read_from_the_environment() {
    let config = AppConfig::from_lookup(lookup_from(&[
      ("SERVER_HOST", "0.0.0.0"),
      ("SERVER_PORT", "8081"),
      ("DATABASE_PATH", "/tmp/m.sqlite"),
      ("SEED_DB", "false"),
      ("LOG_FORMAT", "JSON"),
    ]))
    .unwrap();
    assert_eq!(config.server_host, "0.0.0.0");
    assert_eq!(config.server_port, 8081);
    assert_eq!(config.database_path, PathBuf::from("/tmp/m.sqlite"));
    assert!(!config.seed_db);
    assert_eq!(config.log_format, LogFormat::Json);
  }

  #[test]
  fn out_of_range_ttl_built_by_hand_is_refused() {
    let config = AppConfig {
      session_ttl_hours: i64::MAX / 60,
      ..AppConfig::default()
    };
    assert!(matches!(config.session_ttl(), Err(AppError::Config(_))));
    assert_eq!(AppConfig::default().session_ttl().unwrap(), chrono::Duration::hours(168));
  }

  #[test]
  fn malformed_values_are_config_errors() {
    for pairs in [
      [("SERVER_PORT", "eighty")],
      [("SEED_DB", "maybe")],
      [("SESSION_TTL_HOURS", "0")],
      [("SESSION_TTL_HOURS", "-3")],
      [("SESSION_TTL_HOURS", "9223372036854775807")],
      [("LOG_FORMAT", "xml")],
    ] {
      assert!(matches!(AppConfig::from_lookup(lookup_from(&pairs)), Err(AppError::Config(_))));
    }
  }
}

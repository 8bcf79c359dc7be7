//! CRM configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CRM_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `CRM_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `LOW_STOCK_THRESHOLD` - Restock products with stock below this (default: 10)
//! - `LOW_STOCK_INCREMENT` - Units added per restock (default: 10)
//! - `ORDER_REMINDER_WINDOW_DAYS` - Look-back window for reminders (default: 7)
//! - `CRM_HEARTBEAT_LOG` - Heartbeat log path (default: `/tmp/crm_heartbeat_log.txt`)
//! - `CRM_LOW_STOCK_LOG` - Restock log path (default: `/tmp/low_stock_updates_log.txt`)
//! - `CRM_ORDER_REMINDERS_LOG` - Reminder log path (default: `/tmp/order_reminders_log.txt`)
//! - `CRM_REPORT_LOG` - Report log path (default: `/tmp/crm_report_log.txt`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate in `[0.0, 1.0]` (default: 1.0)

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Full CRM configuration.
#[derive(Debug)]
pub struct CrmConfig {
    /// `PostgreSQL` connection string.
    pub database_url: SecretString,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// Scheduled job parameters.
    pub jobs: JobConfig,
    /// Error tracking, when `SENTRY_DSN` is set.
    pub sentry: Option<SentryConfig>,
}

/// Parameters and log files of the scheduled jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub low_stock_threshold: i32,
    pub low_stock_increment: i32,
    pub reminder_window_days: i64,
    pub heartbeat_log: PathBuf,
    pub low_stock_log: PathBuf,
    pub reminders_log: PathBuf,
    pub report_log: PathBuf,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: 10,
            low_stock_increment: 10,
            reminder_window_days: 7,
            heartbeat_log: PathBuf::from("/tmp/crm_heartbeat_log.txt"),
            low_stock_log: PathBuf::from("/tmp/low_stock_updates_log.txt"),
            reminders_log: PathBuf::from("/tmp/order_reminders_log.txt"),
            report_log: PathBuf::from("/tmp/crm_report_log.txt"),
        }
    }
}

/// Sentry client settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SentryConfig {
    pub dsn: String,
    pub environment: Option<String>,
    pub sample_rate: f32,
}

impl CrmConfig {
    /// Load configuration from the process environment (and `.env`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the database URL is missing or a variable
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value
    /// or `None` if unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the database URL is missing or a variable
    /// cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("CRM_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("CRM_DATABASE_URL".to_string()))?;

        let max_connections =
            parse_or_default(&lookup, "CRM_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CRM_DB_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            max_connections,
            jobs: JobConfig::from_lookup(&lookup)?,
            sentry: SentryConfig::from_lookup(&lookup)?,
        })
    }
}

impl JobConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            low_stock_threshold: parse_or_default(
                lookup,
                "LOW_STOCK_THRESHOLD",
                defaults.low_stock_threshold,
            )?,
            low_stock_increment: parse_or_default(
                lookup,
                "LOW_STOCK_INCREMENT",
                defaults.low_stock_increment,
            )?,
            reminder_window_days: parse_or_default(
                lookup,
                "ORDER_REMINDER_WINDOW_DAYS",
                defaults.reminder_window_days,
            )?,
            heartbeat_log: lookup("CRM_HEARTBEAT_LOG").map_or(defaults.heartbeat_log, PathBuf::from),
            low_stock_log: lookup("CRM_LOW_STOCK_LOG").map_or(defaults.low_stock_log, PathBuf::from),
            reminders_log: lookup("CRM_ORDER_REMINDERS_LOG")
                .map_or(defaults.reminders_log, PathBuf::from),
            report_log: lookup("CRM_REPORT_LOG").map_or(defaults.report_log, PathBuf::from),
        })
    }
}

impl SentryConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        let Some(dsn) = lookup("SENTRY_DSN").filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        let sample_rate: f32 = parse_or_default(lookup, "SENTRY_SAMPLE_RATE", 1.0)?;
        if !(0.0..=1.0).contains(&sample_rate) {
            return Err(ConfigError::InvalidEnvVar(
                "SENTRY_SAMPLE_RATE".to_string(),
                "must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(Some(Self {
            dsn,
            environment: lookup("SENTRY_ENVIRONMENT"),
            sample_rate,
        }))
    }
}

fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CrmConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CrmConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("CRM_DATABASE_URL", "postgres://localhost/crm")]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://localhost/crm");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.jobs, JobConfig::default());
        assert!(config.sentry.is_none());
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fly/crm")]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fly/crm");
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "CRM_DATABASE_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CRM_DATABASE_URL", "postgres://localhost/crm"),
            ("LOW_STOCK_THRESHOLD", "5"),
            ("LOW_STOCK_INCREMENT", " 20 "),
            ("ORDER_REMINDER_WINDOW_DAYS", "14"),
            ("CRM_REPORT_LOG", "/var/log/crm_report.txt"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
            ("SENTRY_SAMPLE_RATE", "0.5"),
        ])
        .unwrap();

        assert_eq!(config.jobs.low_stock_threshold, 5);
        assert_eq!(config.jobs.low_stock_increment, 20);
        assert_eq!(config.jobs.reminder_window_days, 14);
        assert_eq!(config.jobs.report_log, PathBuf::from("/var/log/crm_report.txt"));
        let sentry = config.sentry.unwrap();
        assert!((sentry.sample_rate - 0.5).abs() < f32::EPSILON);
        assert_eq!(sentry.environment, None);
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[
            ("CRM_DATABASE_URL", "postgres://localhost/crm"),
            ("LOW_STOCK_THRESHOLD", "lots"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "LOW_STOCK_THRESHOLD"));

        let err = load(&[
            ("CRM_DATABASE_URL", "postgres://localhost/crm"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
            ("SENTRY_SAMPLE_RATE", "2"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "SENTRY_SAMPLE_RATE"));

        let err = load(&[
            ("CRM_DATABASE_URL", "postgres://localhost/crm"),
            ("CRM_DB_MAX_CONNECTIONS", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[("CRM_DATABASE_URL", "postgres://user:hunter2@db/crm")]).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
    }
}

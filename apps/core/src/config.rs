//! Runtime configuration.
//!
//! Values come from the environment (optionally seeded from a `.env` file) with the
//! `REJECTION_ALARM_` prefix. Timing defaults mirror the browser extension.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use validator::Validate;

use crate::error::AppError;
use crate::fs_manager::PortablePathManager;

const ENV_PREFIX: &str = "REJECTION_ALARM_";

pub const DEFAULT_DEBOUNCE_MS: u64 = 800;
pub const DEFAULT_NAVIGATION_POLL_MS: u64 = 500;
pub const DEFAULT_NAVIGATION_SETTLE_MS: u64 = 1200;
pub const DEFAULT_INITIAL_CHECK_MS: u64 = 2000;
pub const DEFAULT_MIN_BODY_CHARS: usize = 50;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" | "bunyan" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!("Unknown log format: {}", other))),
        }
    }
}

/// Alarm configuration
#[derive(Debug, Clone, Validate)]
pub struct AlarmConfig {
    /// Quiet period after the last content change before a check runs.
    #[validate(range(min = 50, max = 10000))]
    pub debounce_ms: u64,
    /// How often the snapshot file is polled for navigation and content changes.
    #[validate(range(min = 50, max = 10000))]
    pub navigation_poll_ms: u64,
    /// Delay between a navigation and the check of the new page.
    #[validate(range(max = 30000))]
    pub navigation_settle_ms: u64,
    /// Delay before the first check after start.
    #[validate(range(max = 60000))]
    pub initial_check_ms: u64,
    /// Bodies of this many trimmed characters or fewer count as "no message".
    pub min_body_chars: usize,
    /// Root directory for the counter database.
    pub data_dir: PathBuf,
    /// File holding the currently displayed message.
    pub snapshot_path: PathBuf,
    pub log_format: LogFormat,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        let data_dir = PortablePathManager::default_data_dir();
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            navigation_poll_ms: DEFAULT_NAVIGATION_POLL_MS,
            navigation_settle_ms: DEFAULT_NAVIGATION_SETTLE_MS,
            initial_check_ms: DEFAULT_INITIAL_CHECK_MS,
            min_body_chars: DEFAULT_MIN_BODY_CHARS,
            snapshot_path: data_dir.join("current_message.json"),
            data_dir,
            log_format: LogFormat::Pretty,
        }
    }
}

impl AlarmConfig {
    /// Load `.env` if present, then read the environment.
    ///
    /// Also returns the env file that was applied, so it can be logged once
    /// tracing is up.
    pub fn load() -> Result<(Self, Option<PathBuf>), AppError> {
        let env_file = dotenv::dotenv().ok();
        Ok((Self::from_env()?, env_file))
    }

    /// Apply `env_file`, then read the environment. Variables already set win.
    pub fn load_from(env_file: &Path) -> Result<Self, AppError> {
        dotenv::from_path(env_file)
            .map_err(|e| AppError::Config(format!("Cannot load {:?}: {}", env_file, e)))?;
        Self::from_env()
    }

    /// Build the configuration from environment variables only.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let data_dir = env_var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let snapshot_path = env_var("SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("current_message.json"));
        let log_format = match env_var("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => defaults.log_format,
        };

        let config = Self {
            debounce_ms: env_parse("DEBOUNCE_MS", defaults.debounce_ms)?,
            navigation_poll_ms: env_parse("NAVIGATION_POLL_MS", defaults.navigation_poll_ms)?,
            navigation_settle_ms: env_parse("NAVIGATION_SETTLE_MS", defaults.navigation_settle_ms)?,
            initial_check_ms: env_parse("INITIAL_CHECK_MS", defaults.initial_check_ms)?,
            min_body_chars: env_parse("MIN_BODY_CHARS", defaults.min_body_chars)?,
            data_dir,
            snapshot_path,
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn navigation_poll(&self) -> Duration {
        Duration::from_millis(self.navigation_poll_ms)
    }

    pub fn navigation_settle(&self) -> Duration {
        Duration::from_millis(self.navigation_settle_ms)
    }

    pub fn initial_check(&self) -> Duration {
        Duration::from_millis(self.initial_check_ms)
    }

    /// Timing subset handed to the watcher actor
    pub fn timings(&self) -> WatcherTimings {
        WatcherTimings {
            debounce: self.debounce(),
            navigation_settle: self.navigation_settle(),
            initial_check: Some(self.initial_check()),
        }
    }
}

/// Delays used by the watcher when scheduling checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherTimings {
    pub debounce: Duration,
    pub navigation_settle: Duration,
    /// `None` disables the check on start
    pub initial_check: Option<Duration>,
}

impl Default for WatcherTimings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            navigation_settle: Duration::from_millis(DEFAULT_NAVIGATION_SETTLE_MS),
            initial_check: Some(Duration::from_millis(DEFAULT_INITIAL_CHECK_MS)),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, key))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| {
            AppError::Config(format!("{}{} = {:?}: {}", ENV_PREFIX, key, raw, e))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Pretty ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AlarmConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.debounce(), Duration::from_millis(800));
    }
}

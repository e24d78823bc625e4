//! Forum core configuration.
//!
//! # Responsibility
//! - Load reward, storage, logging and refresh settings from TOML.
//! - Validate values before any service is constructed.
//!
//! # Invariants
//! - Missing sections fall back to defaults.
//! - `reward.new_reply` is never negative; `0` disables reply rewards.
//! - `refresh.capacity` is within `1..=MAX_REFRESH_CAPACITY`.

use crate::refresh::MAX_REFRESH_CAPACITY;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_DB_FILE_NAME: &str = "forum.sqlite3";
const DEFAULT_REFRESH_CAPACITY: usize = 256;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config syntax: {err}"),
            Self::Invalid(message) => write!(f, "invalid config value: {message}"),
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

/// Top-level settings resolved once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ForumConfig {
    pub reward: RewardConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub refresh: RefreshConfig,
}

/// Balance rewards paid by the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Amount credited per new reply; `0` disables the reward.
    pub new_reply: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_FILE_NAME),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute directory for rolling log files; `None` leaves logging off.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Per-subscriber buffer of the refresh broadcast channel.
    pub capacity: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_REFRESH_CAPACITY,
        }
    }
}

impl ForumConfig {
    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reward.new_reply < 0 {
            return Err(ConfigError::Invalid(format!(
                "reward.new_reply must not be negative, got {}",
                self.reward.new_reply
            )));
        }
        if self.refresh.capacity == 0 || self.refresh.capacity > MAX_REFRESH_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "refresh.capacity must be between 1 and {MAX_REFRESH_CAPACITY}, got {}",
                self.refresh.capacity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ForumConfig};
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ForumConfig::from_toml_str("").unwrap();
        assert_eq!(config, ForumConfig::default());
        assert_eq!(config.reward.new_reply, 0);
        assert_eq!(config.refresh.capacity, 256);
        assert_eq!(config.database.path, PathBuf::from("forum.sqlite3"));
    }

    #[test]
    fn parses_all_sections() {
        let config = ForumConfig::from_toml_str(
            r#"
            [reward]
            new_reply = 50

            [database]
            path = "/srv/forum/forum.sqlite3"

            [logging]
            level = "warn"
            dir = "/var/log/forum"

            [refresh]
            capacity = 16
            "#,
        )
        .unwrap();

        assert_eq!(config.reward.new_reply, 50);
        assert_eq!(config.database.path, PathBuf::from("/srv/forum/forum.sqlite3"));
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.dir, Some(PathBuf::from("/var/log/forum")));
        assert_eq!(config.refresh.capacity, 16);
    }

    #[test]
    fn rejects_negative_reward_and_zero_capacity() {
        let negative = ForumConfig::from_toml_str("[reward]\nnew_reply = -5").unwrap_err();
        assert!(matches!(negative, ConfigError::Invalid(_)));

        let zero = ForumConfig::from_toml_str("[refresh]\ncapacity = 0").unwrap_err();
        assert!(matches!(zero, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_capacity_above_bus_limit() {
        let at_limit = ForumConfig::from_toml_str("[refresh]\ncapacity = 65536").unwrap();
        assert_eq!(at_limit.refresh.capacity, 65_536);

        let huge =
            ForumConfig::from_toml_str("[refresh]\ncapacity = 4611686018427387905").unwrap_err();
        assert!(matches!(huge, ConfigError::Invalid(_)));
        assert!(huge.to_string().contains("4611686018427387905"));
    }

    #[test]
    fn reports_syntax_errors() {
        let err = ForumConfig::from_toml_str("[reward\nnew_reply = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file_and_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forum.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[reward]\nnew_reply = 3").unwrap();

        let config = ForumConfig::load(&path).unwrap();
        assert_eq!(config.reward.new_reply, 3);

        let missing = ForumConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}

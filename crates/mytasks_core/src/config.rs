//! Application configuration and validation.
//!
//! # Responsibility
//! - Declare which backing-store implementation a process runs against.
//! - Validate configuration up front with semantic errors instead of
//!   failing deep inside storage code.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Backing-store selection; both implementations sit behind the same
/// repository trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Durable SQLite database (requires `db_path`).
    Sqlite,
    /// Process-local in-memory backend with optional sample data.
    Memory,
}

/// Process configuration, deserialized from a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    pub backend: BackendKind,
    /// SQLite file path; required when `backend = sqlite`.
    #[serde(default)]
    pub db_path: Option<String>,
    /// Directory holding per-identity fallback documents.
    pub fallback_dir: String,
    /// Log level override; build-mode default applies when absent.
    #[serde(default)]
    pub log_level: Option<String>,
    /// Absolute log directory; logging stays uninitialized when absent.
    #[serde(default)]
    pub log_dir: Option<String>,
}

/// Configuration validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    /// `backend = sqlite` declared without a database path.
    MissingDbPath,
    EmptyFallbackDir,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
            Self::MissingDbPath => {
                write!(f, "backend `sqlite` requires a non-empty `db_path`")
            }
            Self::EmptyFallbackDir => write!(f, "`fallback_dir` cannot be empty"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl AppConfig {
    /// Parses and validates one JSON config document.
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(payload)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks declaration-level invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == BackendKind::Sqlite
            && self.db_path.as_deref().map_or(true, |path| path.trim().is_empty())
        {
            return Err(ConfigError::MissingDbPath);
        }
        if self.fallback_dir.trim().is_empty() {
            return Err(ConfigError::EmptyFallbackDir);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, BackendKind, ConfigError};

    #[test]
    fn parses_minimal_memory_config() {
        let config = AppConfig::from_json_str(
            r#"{ "backend": "memory", "fallback_dir": "/tmp/mytasks-fallback" }"#,
        )
        .unwrap();
        assert_eq!(config.backend, BackendKind::Memory);
        assert!(config.db_path.is_none());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn sqlite_backend_requires_db_path() {
        let err = AppConfig::from_json_str(
            r#"{ "backend": "sqlite", "fallback_dir": "/tmp/mytasks-fallback" }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingDbPath));

        let blank = AppConfig::from_json_str(
            r#"{ "backend": "sqlite", "db_path": "   ", "fallback_dir": "/tmp/x" }"#,
        )
        .unwrap_err();
        assert!(matches!(blank, ConfigError::MissingDbPath));
    }

    #[test]
    fn fallback_dir_cannot_be_blank() {
        let err = AppConfig::from_json_str(r#"{ "backend": "memory", "fallback_dir": " " }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyFallbackDir));
    }

    #[test]
    fn malformed_document_reports_parse_error() {
        let err = AppConfig::from_json_str("{ backend: nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

//! Sorter configuration.
//!
//! # Responsibility
//! - Describe where source documents, filed copies, the ledger and logs live.
//! - Load settings from an optional JSON file and `DOCSORT_*` environment
//!   variables.
//!
//! # Invariants
//! - Precedence is defaults < file < environment < explicit caller overrides.
//! - `log_level` is validated on load, not at first log call.

use crate::logging::{default_log_level, normalize_level};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub const ENV_SOURCE_DIR: &str = "DOCSORT_SOURCE_DIR";
pub const ENV_SORTED_DIR: &str = "DOCSORT_SORTED_DIR";
pub const ENV_DB_PATH: &str = "DOCSORT_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "DOCSORT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "DOCSORT_LOG_DIR";

const DEFAULT_SOURCE_DIR: &str = "docs";
const DEFAULT_SORTED_DIR: &str = "sorted";
const DEFAULT_DB_FILE_NAME: &str = "files_metadata.db";

/// Paths and logging settings for one sorter run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SorterConfig {
    /// Directory holding unsorted documents.
    pub source_dir: PathBuf,
    /// Root under which category directories are created.
    pub sorted_dir: PathBuf,
    /// Ledger SQLite file.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub log_dir: Option<PathBuf>,
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            sorted_dir: PathBuf::from(DEFAULT_SORTED_DIR),
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

/// Configuration load errors.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidLogLevel(_) => None,
        }
    }
}

impl SorterConfig {
    /// Parses a JSON config document. Missing fields take defaults.
    pub fn from_json_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validated()
    }

    /// Reads and parses a JSON config file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw, path)
    }

    /// Loads `path` when given, else defaults, then applies process env.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::load_file(path)?,
            None => Self::default(),
        };
        base.with_env(|key| std::env::var(key).ok())
    }

    /// Applies `DOCSORT_*` overrides read through `lookup`.
    ///
    /// Empty values are treated as unset.
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = lookup(ENV_SOURCE_DIR) {
            self.source_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_SORTED_DIR) {
            self.sorted_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_DB_PATH) {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value));
        }

        self.validated()
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        self.log_level = normalize_level(&self.log_level)
            .map_err(ConfigError::InvalidLogLevel)?
            .to_string();
        Ok(self)
    }
}

//! Bootstrap configuration and root folder resolution
//!
//! Settings come from, in priority order:
//! 1. Command-line arguments / environment (applied by the server binary)
//! 2. TOML config file
//! 3. Compiled defaults
//!
//! A missing config file is not an error; a file that exists but does not
//! parse is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "LCARDS_CONFIG";

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV_VAR: &str = "LCARDS_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "lcards.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// SQLite database file; defaults to `<root>/lcards.db`
    pub database_path: Option<PathBuf>,

    /// Address the HTTP server binds to
    pub host: String,

    /// HTTP server port
    pub port: u16,

    /// Directory scanned recursively for `*.csv` word files
    pub catalog_dir: Option<PathBuf>,

    /// Ingest the built-in seed words
    pub seed_words: bool,

    /// Seconds between progress sync sweeps
    pub sync_interval_secs: u64,

    /// Seconds between catalog ingestion runs
    pub ingest_interval_secs: u64,

    /// Offset of the reference day from UTC, in minutes
    pub utc_offset_minutes: i32,

    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            host: "127.0.0.1".to_string(),
            port: 5780,
            catalog_dir: None,
            seed_words: true,
            sync_interval_secs: 60,
            ingest_interval_secs: 3600,
            utc_offset_minutes: 0,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the first config file found, or defaults when there is none
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match find_config_file(explicit) {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => {
                warn!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.sync_interval_secs == 0 {
            return Err(Error::Config("sync_interval_secs must be > 0".to_string()));
        }
        if self.ingest_interval_secs == 0 {
            return Err(Error::Config("ingest_interval_secs must be > 0".to_string()));
        }
        if crate::time::offset_from_minutes(self.utc_offset_minutes).is_none() {
            return Err(Error::Config(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// Database path from config, else inside the resolved root folder
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| resolve_root_folder().join(DATABASE_FILE_NAME))
    }
}

/// Locate the config file
///
/// Explicit path first, then `LCARDS_CONFIG`, then
/// `<config dir>/lcards/config.toml`. Explicit and environment paths are
/// returned as given, so loading them fails if they do not exist; the
/// default location is only returned when the file is present.
pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir()
        .map(|d| d.join("lcards").join("config.toml"))
        .filter(|path| path.exists())
}

/// Root folder: `LCARDS_ROOT_FOLDER`, else the OS data directory
pub fn resolve_root_folder() -> PathBuf {
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV_VAR) {
        return PathBuf::from(path);
    }
    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("lcards"))
        .unwrap_or_else(|| PathBuf::from("./lcards_data"))
}

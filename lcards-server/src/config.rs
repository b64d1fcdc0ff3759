//! lcards-server runtime configuration
//!
//! Command-line/environment overrides are layered over the TOML bootstrap
//! config, which is layered over compiled defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use lcards_common::config::TomlConfig;
use lcards_common::{time, Error, Result};

use crate::ingest::CatalogSources;

/// Values given on the command line or through `LCARDS_*` variables
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<PathBuf>,
    pub catalog_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Fully resolved server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub catalog: CatalogSources,
    pub sync_interval: Duration,
    pub ingest_interval: Duration,
    pub day_offset: FixedOffset,
    pub log_level: String,
}

impl Config {
    pub fn resolve(toml: TomlConfig, overrides: Overrides) -> Result<Self> {
        toml.validate()?;

        let host = overrides.host.unwrap_or_else(|| toml.host.clone());
        let port = overrides.port.unwrap_or(toml.port);
        let bind_addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address {}:{}: {}", host, port, e)))?;

        let day_offset = time::offset_from_minutes(toml.utc_offset_minutes).ok_or_else(|| {
            Error::Config(format!(
                "utc_offset_minutes out of range: {}",
                toml.utc_offset_minutes
            ))
        })?;

        Ok(Self {
            bind_addr,
            database_path: overrides
                .database
                .unwrap_or_else(|| toml.resolved_database_path()),
            catalog: CatalogSources {
                seed_words: toml.seed_words,
                catalog_dir: overrides.catalog_dir.or(toml.catalog_dir),
            },
            sync_interval: Duration::from_secs(toml.sync_interval_secs),
            ingest_interval: Duration::from_secs(toml.ingest_interval_secs),
            day_offset,
            log_level: overrides.log_level.unwrap_or(toml.logging.level),
        })
    }
}

//! Station configuration loaded from environment variables
//!
//! Common settings (Redis connection, environment mode, log level) come from
//! `radiyo-shared-config`; the station-specific settings are layered on top.

use std::env;

use anyhow::{Context, Result};
use radiyo_shared_config::CommonConfig;

/// Which backend the station should try to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendMode {
    /// Use Redis when reachable, otherwise fall back to memory
    #[default]
    Redis,
    /// Always use the in-memory backend
    Memory,
}

impl std::str::FromStr for BackendMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(format!("unknown backend mode: {}", other)),
        }
    }
}

/// Station configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with other services
    pub common: CommonConfig,

    /// Backend selection
    pub backend: BackendMode,

    /// Prefix applied to every Redis key and channel
    pub key_prefix: String,

    /// Clear the queue and the playback record when the session starts
    pub reset_on_start: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let common = CommonConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        Ok(Self {
            common,

            backend: env::var("STATION_BACKEND")
                .unwrap_or_else(|_| "redis".to_string())
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("Invalid STATION_BACKEND value")?,

            key_prefix: env::var("STATION_KEY_PREFIX").unwrap_or_else(|_| "radiyo".to_string()),

            reset_on_start: env::var("STATION_RESET_ON_START")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("Invalid STATION_RESET_ON_START value")?,
        })
    }

    /// Get Redis connection URL, password included
    pub fn redis_url(&self) -> String {
        self.common.redis.connection_url()
    }
}

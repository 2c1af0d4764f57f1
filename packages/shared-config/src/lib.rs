//! Shared configuration types for Radiyo services
//!
//! This crate provides the environment-driven configuration pieces that
//! every Radiyo process needs (backend connection, environment mode,
//! log level), so that station-specific settings can be layered on top.

mod error;
mod redis;

pub use error::{ConfigError, ConfigResult};
pub use redis::RedisConfig;

use std::env;

/// Common configuration shared between all services
#[derive(Debug, Clone)]
pub struct CommonConfig {
    /// Redis configuration (playback record backend)
    pub redis: RedisConfig,

    /// Environment mode (development, staging, production)
    pub environment: Environment,

    /// Log level (from RUST_LOG or LOG_LEVEL)
    pub log_level: String,
}

/// Application environment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "staging" | "stage" => Self::Staging,
            _ => Self::Development,
        })
    }
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl CommonConfig {
    /// Load common configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            redis: RedisConfig::from_env()?,
            environment: get_env_or_default("ENVIRONMENT", "development")
                .parse()
                .unwrap_or_default(),
            log_level: env::var("RUST_LOG")
                .or_else(|_| env::var("LOG_LEVEL"))
                .unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Get a required environment variable
pub fn get_required_env(name: &str) -> ConfigResult<String> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Get an optional environment variable with a default
pub fn get_env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable into a specific type, falling back to
/// `default` when the variable is unset
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("stage".parse::<Environment>().unwrap(), Environment::Staging);
        assert_eq!(
            "anything".parse::<Environment>().unwrap(),
            Environment::Development
        );
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Production.to_string(), "production");
        assert_eq!(Environment::Development.to_string(), "development");
    }

    #[test]
    fn test_common_config_defaults() {
        temp_env::with_vars_unset(
            ["ENVIRONMENT", "RUST_LOG", "LOG_LEVEL", "REDIS_URL", "REDIS_PASSWORD"],
            || {
                let config = CommonConfig::from_env().unwrap();
                assert_eq!(config.environment, Environment::Development);
                assert_eq!(config.log_level, "info");
                assert_eq!(config.redis.url, "redis://localhost:6379");
            },
        );
    }

    #[test]
    fn test_log_level_falls_back_to_log_level_var() {
        temp_env::with_vars(
            [("RUST_LOG", None), ("LOG_LEVEL", Some("warn"))],
            || {
                let config = CommonConfig::from_env().unwrap();
                assert_eq!(config.log_level, "warn");
            },
        );
    }

    #[test]
    fn test_parse_env_invalid_value() {
        temp_env::with_var("RADIYO_TEST_NUMBER", Some("abc"), || {
            let result: ConfigResult<u64> = parse_env("RADIYO_TEST_NUMBER", 5);
            assert!(matches!(result, Err(ConfigError::InvalidValue(name, _)) if name == "RADIYO_TEST_NUMBER"));
        });
    }

    #[test]
    fn test_get_required_env_missing() {
        temp_env::with_var_unset("RADIYO_TEST_REQUIRED", || {
            assert!(matches!(
                get_required_env("RADIYO_TEST_REQUIRED"),
                Err(ConfigError::MissingEnvVar(_))
            ));
        });
    }
}

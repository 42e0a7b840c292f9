//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::fetch::FetcherConfig;
use crate::models::MIN_RANKED_GAMES;
use crate::parse_duration;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Where the published documents live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL (`https://...`) or local directory holding `data/`
    #[serde(default = "default_location")]
    pub location: String,
}

fn default_location() -> String {
    ".".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
        }
    }
}

/// HTTP cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// How long cached lookup tables stay fresh, e.g. "1h" or "30m"
    #[serde(default = "default_ttl")]
    pub ttl: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./data/cache")
}

fn default_ttl() -> String {
    "1h".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("ladder-stats/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            ttl: default_ttl(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Leaderboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Games required to be ranked
    #[serde(default = "default_min_games")]
    pub min_games: u32,
}

fn default_min_games() -> u32 {
    MIN_RANKED_GAMES
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_games: default_min_games(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Directory of static dashboard pages served next to the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            static_dir: None,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub ranking: RankingConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            source: SourceConfig::default(),
            cache: CacheConfig::default(),
            ranking: RankingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.location.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Source location must not be empty".to_string(),
            ));
        }

        if self.cache_ttl().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "Invalid cache TTL: {}",
                self.cache.ttl
            )));
        }

        if self.cache.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        parse_duration(&self.cache.ttl)
    }

    /// Fetcher settings derived from the cache section.
    pub fn fetcher_config(&self) -> FetcherConfig {
        let defaults = FetcherConfig::default();
        FetcherConfig {
            cache_dir: self.cache.dir.clone(),
            cache_ttl: self.cache_ttl().unwrap_or(defaults.cache_ttl),
            timeout: Duration::from_secs(self.cache.timeout_seconds),
            user_agent: self.cache.user_agent.clone(),
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.source.location, ".");
        assert_eq!(config.cache.dir, PathBuf::from("./data/cache"));
        assert_eq!(config.ranking.min_games, 10);
        assert_eq!(config.server.port, 8080);
        assert!(config.server.static_dir.is_none());
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_ttl() {
        let mut config = AppConfig::default();
        config.cache.ttl = "soon".to_string();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.cache.timeout_seconds = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            log_level = "debug"

            [source]
            location = "https://ladder.example.org"

            [ranking]
            min_games = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.source.location, "https://ladder.example.org");
        assert_eq!(config.ranking.min_games, 25);
        assert_eq!(config.cache.ttl, "1h");
        assert_eq!(config.server.cors_origin, "*");
    }

    #[test]
    fn test_fetcher_config() {
        let mut config = AppConfig::default();
        config.cache.ttl = "30m".to_string();
        config.cache.timeout_seconds = 5;

        let fetcher = config.fetcher_config();

        assert_eq!(fetcher.cache_ttl, Duration::from_secs(1800));
        assert_eq!(fetcher.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();

        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.cache.dir, parsed.cache.dir);
    }
}

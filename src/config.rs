use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::constants::{DEFAULT_CDN_HOST, DEFAULT_PIAZZA_BASE_URL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Piazza account
    pub network_id: String,
    pub user_email: String,
    pub user_password: String,

    // Piazza endpoints
    pub base_url: String,
    pub cdn_host: String,
    pub http_timeout: Duration,

    // Feed selection
    pub feed_mode: FeedMode,
    pub feed_limit: u32,
    pub unanswered_only: bool,
    pub request_delay: Duration,

    // Transcript
    pub include_followups: bool,

    // Output
    pub output_path: Option<PathBuf>,
    pub content_dump_path: Option<PathBuf>,
    pub metadata_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    /// Only posts the platform reports as unresolved
    Unresolved,
    /// Every post in the course feed
    All,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Piazza account
            network_id: required_env("PIAZZA_NETWORK_ID")?,
            user_email: required_env("PIAZZA_USER_EMAIL")?,
            user_password: required_env("PIAZZA_USER_PASSWORD")?,

            // Piazza endpoints
            base_url: env_or_default("PIAZZA_BASE_URL", DEFAULT_PIAZZA_BASE_URL),
            cdn_host: env_or_default("PIAZZA_CDN_HOST", DEFAULT_CDN_HOST),
            http_timeout: Duration::from_secs(parse_env_u64("HTTP_TIMEOUT_SECS", 30)?),

            // Feed selection
            feed_mode: parse_feed_mode(&env_or_default("FEED_MODE", "unresolved"))?,
            feed_limit: parse_env_u32("FEED_LIMIT", 100_000)?,
            unanswered_only: parse_env_bool("UNANSWERED_ONLY", false)?,
            request_delay: Duration::from_millis(parse_env_u64("REQUEST_DELAY_MS", 1000)?),

            // Transcript
            include_followups: parse_env_bool("INCLUDE_FOLLOWUPS", true)?,

            // Output
            output_path: optional_env("OUTPUT_PATH").map(PathBuf::from),
            content_dump_path: optional_env("CONTENT_DUMP_PATH").map(PathBuf::from),
            metadata_path: optional_env("METADATA_PATH").map(PathBuf::from),
        })
    }

    /// Configuration with harmless defaults for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            network_id: "test-network".to_string(),
            user_email: "ta@example.com".to_string(),
            user_password: "hunter2".to_string(),
            base_url: DEFAULT_PIAZZA_BASE_URL.to_string(),
            cdn_host: DEFAULT_CDN_HOST.to_string(),
            http_timeout: Duration::from_secs(5),
            feed_mode: FeedMode::Unresolved,
            feed_limit: 100,
            unanswered_only: false,
            request_delay: Duration::ZERO,
            include_followups: true,
            output_path: None,
            content_dump_path: None,
            metadata_path: None,
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network_id.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "PIAZZA_NETWORK_ID".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.feed_limit == 0 {
            return Err(ConfigError::InvalidValue {
                name: "FEED_LIMIT".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.http_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "HTTP_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        for (name, value) in [
            ("PIAZZA_BASE_URL", &self.base_url),
            ("PIAZZA_CDN_HOST", &self.cdn_host),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    message: format!("not an absolute URL: '{value}'"),
                });
            }
        }
        Ok(())
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}

fn parse_feed_mode(value: &str) -> Result<FeedMode, ConfigError> {
    match value.to_lowercase().as_str() {
        "unresolved" => Ok(FeedMode::Unresolved),
        "all" => Ok(FeedMode::All),
        _ => Err(ConfigError::InvalidValue {
            name: "FEED_MODE".to_string(),
            message: format!("must be 'unresolved' or 'all', got '{value}'"),
        }),
    }
}

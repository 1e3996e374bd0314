//! Configuration for feedpost.
//!
//! Values come from three layers: built-in defaults, an optional TOML file,
//! then command-line flags and environment variables (applied by `main`).
//! [`Config::validate`] turns the merged result into [`Settings`], failing
//! before the notifier starts if anything required is missing.
use crate::format::DEFAULT_TEMPLATE;
use crate::publish::{TwitterCredentials, DEFAULT_API_BASE};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Feed URL is required")]
    MissingFeed,

    #[error("Invalid feed URL '{url}': {reason}")]
    InvalidFeedUrl { url: String, reason: String },

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("Token credentials missing: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Raw configuration as read from file and command line.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
///
/// SEC-015: Custom Debug impl masks credentials to prevent secret leakage
/// in logs, error messages, and debug output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// RSS/Atom feed URL.
    pub feed: Option<String>,

    /// Seconds between polls.
    pub refresh: u64,

    /// HTTP timeout for one feed fetch, in seconds.
    pub timeout: u64,

    /// Message template, e.g. `{Title} - {Link}`.
    pub template: String,

    /// Log messages instead of posting them.
    pub dry: bool,

    /// File with exclusion patterns, one per line.
    pub exclusions: PathBuf,

    /// Base URL of the posting API.
    pub api_base: String,

    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub access_token: Option<String>,
    pub access_secret: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: None,
            refresh: 30,
            timeout: 5,
            template: DEFAULT_TEMPLATE.to_string(),
            dry: false,
            exclusions: PathBuf::from("exclusion-patterns.txt"),
            api_base: DEFAULT_API_BASE.to_string(),
            consumer_key: None,
            consumer_secret: None,
            access_token: None,
            access_secret: None,
        }
    }
}

/// SEC-015: Mask credentials in Debug output to prevent secret leakage.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Config")
            .field("feed", &self.feed)
            .field("refresh", &self.refresh)
            .field("timeout", &self.timeout)
            .field("template", &self.template)
            .field("dry", &self.dry)
            .field("exclusions", &self.exclusions)
            .field("api_base", &self.api_base)
            .field("consumer_key", &redact(&self.consumer_key))
            .field("consumer_secret", &redact(&self.consumer_secret))
            .field("access_token", &redact(&self.access_token))
            .field("access_secret", &redact(&self.access_secret))
            .finish()
    }
}

/// Where formatted messages go.
#[derive(Debug)]
pub enum SinkSettings {
    Console,
    Twitter {
        api_base: String,
        credentials: TwitterCredentials,
    },
}

/// Validated configuration, ready to wire the pipeline.
#[derive(Debug)]
pub struct Settings {
    pub feed: Url,
    pub refresh: Duration,
    pub timeout: Duration,
    pub template: String,
    pub exclusions: PathBuf,
    pub sink: SinkSettings,
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 11] = [
        "feed",
        "refresh",
        "timeout",
        "template",
        "dry",
        "exclusions",
        "api_base",
        "consumer_key",
        "consumer_secret",
        "access_token",
        "access_secret",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // SEC-014: Check file size before reading to prevent memory exhaustion
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Checks required values and builds [`Settings`].
    ///
    /// Credentials are only required when posting for real (`dry = false`).
    pub fn validate(self) -> Result<Settings, ConfigError> {
        let feed = self.feed.filter(|f| !f.trim().is_empty()).ok_or(ConfigError::MissingFeed)?;
        let feed = parse_feed_url(&feed)?;

        if self.refresh == 0 {
            return Err(ConfigError::ZeroDuration("refresh"));
        }
        if self.timeout == 0 {
            return Err(ConfigError::ZeroDuration("timeout"));
        }

        let sink = if self.dry {
            SinkSettings::Console
        } else {
            let mut missing = Vec::new();
            let mut require = |name: &'static str, value: Option<String>| {
                match value.filter(|v| !v.is_empty()) {
                    Some(v) => Some(SecretString::from(v)),
                    None => {
                        missing.push(name);
                        None
                    }
                }
            };
            let consumer_key = require("consumer_key", self.consumer_key);
            let consumer_secret = require("consumer_secret", self.consumer_secret);
            let access_token = require("access_token", self.access_token);
            let access_secret = require("access_secret", self.access_secret);

            match (consumer_key, consumer_secret, access_token, access_secret) {
                (Some(consumer_key), Some(consumer_secret), Some(access_token), Some(access_secret)) => {
                    SinkSettings::Twitter {
                        api_base: self.api_base,
                        credentials: TwitterCredentials {
                            consumer_key,
                            consumer_secret,
                            access_token,
                            access_secret,
                        },
                    }
                }
                _ => return Err(ConfigError::MissingCredentials(missing)),
            }
        };

        Ok(Settings {
            feed,
            refresh: Duration::from_secs(self.refresh),
            timeout: Duration::from_secs(self.timeout),
            template: self.template,
            exclusions: self.exclusions,
            sink,
        })
    }
}

fn parse_feed_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidFeedUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(invalid(format!(
            "unsupported scheme {} (only http/https allowed)",
            scheme
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 10;

const TOKEN_DIR_NAME: &str = ".shiptornado";
const TOKEN_FILE_NAME: &str = "token";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
    /// Upper bound on the identity fetch run while verifying a stored credential.
    pub verify_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    #[must_use]
    pub fn verify(&self) -> Duration {
        Duration::from_secs(self.verify_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            verify_secs: DEFAULT_VERIFY_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without a trailing slash, e.g. `http://localhost:5001`.
    pub api_base_url: String,
    /// File holding the persisted bearer credential.
    pub token_path: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build a config with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_base_url` is not an absolute http(s) URL.
    pub fn new(api_base_url: &str, token_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: normalize_base_url(api_base_url)?,
            token_path: token_path.into(),
            timeouts: Timeouts::default(),
        })
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `SHIPTORNADO_API_BASE_URL`: default `http://localhost:5001`
    /// - `SHIPTORNADO_TOKEN_PATH`: default `$HOME/.shiptornado/token`
    /// - `SHIPTORNADO_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SHIPTORNADO_CONNECT_TIMEOUT_SECS`: default 10
    /// - `SHIPTORNADO_VERIFY_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url =
            std::env::var("SHIPTORNADO_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let token_path = std::env::var_os("SHIPTORNADO_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_token_path);
        let timeouts = Timeouts {
            request_secs: env_parse_u64("SHIPTORNADO_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("SHIPTORNADO_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            verify_secs: env_parse_u64("SHIPTORNADO_VERIFY_TIMEOUT_SECS", DEFAULT_VERIFY_TIMEOUT_SECS),
        };

        Ok(Self { api_base_url: normalize_base_url(&raw_url)?, token_path, timeouts })
    }

    /// Replace the base URL, re-validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not an absolute http(s) URL.
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_base_url = normalize_base_url(url)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default, "ignoring unparsable duration");
            default
        }),
        Err(_) => default,
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidBaseUrl { url: raw.to_owned(), reason: e.to_string() })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_owned(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::InvalidBaseUrl { url: raw.to_owned(), reason: "missing host".to_owned() });
    }
    Ok(trimmed.to_owned())
}

fn default_token_path() -> PathBuf {
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));
    let base = home.map_or_else(|| PathBuf::from("."), PathBuf::from);
    base.join(TOKEN_DIR_NAME).join(TOKEN_FILE_NAME)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

//! Directory client configuration.

use url::Url;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default cache time-to-live in seconds (5 minutes).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Errors constructing a [`DirectoryConfig`] or the client built from it.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The base URL could not be parsed.
    #[error("invalid directory base URL {url:?}: {source}")]
    InvalidBaseUrl {
        /// The offending URL string.
        url: String,
        /// Parse failure detail.
        source: url::ParseError,
    },

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {reason}")]
    ClientBuild {
        /// Builder failure detail.
        reason: String,
    },
}

/// Configuration for the [`DirectoryClient`](crate::DirectoryClient).
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Base URL of the directory API (e.g. `https://directory.example.com/api`).
    pub base_url: Url,
    /// Per-request timeout in seconds (default: 10).
    pub timeout_secs: u64,
    /// Cache entry time-to-live in seconds (default: 300).
    pub cache_ttl_secs: u64,
}

impl DirectoryConfig {
    /// Create a configuration with default timeout and cache TTL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
        let raw = base_url.as_ref();
        let base_url = Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            source,
        })?;
        Ok(Self {
            base_url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        })
    }

    /// Override the per-request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Override the cache TTL. Tests use sub-second values to exercise
    /// expiry without waiting five minutes.
    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }
}

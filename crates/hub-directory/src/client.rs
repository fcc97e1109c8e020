//! The directory HTTP client.

use std::time::Duration;

use hub_core::NormalizedName;

use crate::cache::ResolutionCache;
use crate::config::{ConfigError, DirectoryConfig};
use crate::error::DirectoryError;
use crate::retry::{with_backoff, Attempt};
use crate::types::{ExternalIdentity, Resolution, WireResponse};

/// Client for the external read-only player directory.
///
/// Cheap to share: wrap in an `Arc` and clone the handle across tasks.
/// Holds no authority over accounts — resolution and cache population are
/// its only effects.
#[derive(Debug)]
pub struct DirectoryClient {
    client: reqwest::Client,
    config: DirectoryConfig,
    cache: ResolutionCache,
}

impl DirectoryClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ClientBuild`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: DirectoryConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::ClientBuild {
                reason: e.to_string(),
            })?;
        let cache = ResolutionCache::new(Duration::from_secs(config.cache_ttl_secs));
        Ok(Self {
            client,
            config,
            cache,
        })
    }

    /// Resolve a display name to a public profile.
    ///
    /// Consults the TTL cache first. On a miss, performs
    /// `GET {base}/users?name={name}` with up to three attempts:
    /// 404 maps to [`Resolution::NotFound`] and 403 to
    /// [`Resolution::Private`] without retry; other non-2xx statuses and
    /// transport failures are retried with backoff.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::Unavailable`] when every attempt failed
    /// transiently, [`DirectoryError::Deserialization`] when a 2xx body
    /// matched no known shape.
    pub async fn resolve(&self, name: &NormalizedName) -> Result<Resolution, DirectoryError> {
        if let Some(cached) = self.cache.get(name) {
            tracing::debug!(name = %name, "directory cache hit");
            return Ok(cached);
        }

        let outcome = with_backoff(|| self.fetch(name)).await;
        let resolution = match outcome {
            Ok(Ok(resolution)) => resolution,
            Ok(Err(decode_err)) => return Err(decode_err),
            Err((attempts, reason)) => {
                return Err(DirectoryError::Unavailable { attempts, reason })
            }
        };

        self.cache.store(name.clone(), resolution.clone());
        Ok(resolution)
    }

    /// Degraded placeholder identity for UI use during an outage.
    ///
    /// Never satisfies verification: it is offline, private, and carries
    /// a local-only id.
    pub fn fallback_identity(&self, display_name: &str) -> ExternalIdentity {
        ExternalIdentity::degraded_fallback(display_name)
    }

    /// One resolution attempt, classified for the retry loop.
    async fn fetch(
        &self,
        name: &NormalizedName,
    ) -> Attempt<Result<Resolution, DirectoryError>> {
        let mut url = self.config.base_url.clone();
        {
            // Url::join would discard a non-slash-terminated base path.
            let mut segments = match url.path_segments_mut() {
                Ok(segments) => segments,
                Err(()) => {
                    return Attempt::Transient("directory base URL cannot be a base".to_string())
                }
            };
            segments.pop_if_empty().push("users");
        }
        url.query_pairs_mut().append_pair("name", name.as_str());

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return Attempt::Transient(format!("transport: {e}")),
        };

        let status = response.status();
        match status.as_u16() {
            404 => return Attempt::Done(Ok(Resolution::NotFound)),
            403 => return Attempt::Done(Ok(Resolution::Private)),
            s if !status.is_success() => {
                return Attempt::Transient(format!("directory returned HTTP {s}"))
            }
            _ => {}
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Attempt::Transient(format!("reading body: {e}")),
        };

        match serde_json::from_str::<WireResponse>(&body) {
            Ok(wire) => match wire.into_profile().and_then(|p| p.into_identity()) {
                // An empty result set from a 2xx is the array-shaped
                // spelling of "no such user".
                None => Attempt::Done(Ok(Resolution::NotFound)),
                Some(identity) => Attempt::Done(Ok(Resolution::Found(identity))),
            },
            Err(e) => Attempt::Done(Err(DirectoryError::Deserialization {
                name: name.as_str().to_string(),
                reason: e.to_string(),
            })),
        }
    }
}

//! The account gateway: bounded retry over the store seam.

use std::sync::Arc;
use std::time::Duration;

use hub_core::{ExternalId, NormalizedName, SubjectId};

use crate::account::{LinkedAccount, NewLinkedAccount};
use crate::store::{AccountStore, StoreError};

/// Bounded linear-backoff retry policy for account creation.
///
/// The retry exists to ride out the store's eventual-consistency window
/// on freshly issued sessions. It is injected rather than hard-coded so
/// deployments can tune it, or zero it out entirely if the backend's
/// consistency model changes.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first (default: 5).
    pub max_attempts: u32,
    /// Backoff unit; attempt `n` (1-based) waits `base_delay × n`
    /// before retrying (default: 1s).
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Linear backoff for the given 1-based attempt number.
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Caller-facing gateway failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The identity (or subject) is already linked — a concurrent signup
    /// won the race, or the caller should have taken the login path.
    #[error("identity is already linked to an account")]
    AlreadyLinked,

    /// The store could not serve the request.
    #[error("account store unavailable: {reason}")]
    StoreUnavailable {
        /// Last failure detail observed.
        reason: String,
    },
}

/// Gateway over the account store: lookups pass through, creation gets
/// retry and error mapping.
#[derive(Clone)]
pub struct AccountGateway {
    store: Arc<dyn AccountStore>,
    retry: RetryPolicy,
}

impl AccountGateway {
    /// Wrap a store with the given creation retry policy.
    pub fn new(store: Arc<dyn AccountStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Exact lookup by directory identifier.
    pub async fn find_by_external_id(
        &self,
        id: &ExternalId,
    ) -> Result<Option<LinkedAccount>, GatewayError> {
        self.store.find_by_external_id(id).await.map_err(map_lookup)
    }

    /// Exact lookup by internal subject identifier.
    pub async fn find_by_subject_id(
        &self,
        id: &SubjectId,
    ) -> Result<Option<LinkedAccount>, GatewayError> {
        self.store.find_by_subject_id(id).await.map_err(map_lookup)
    }

    /// Case-insensitive lookup by display name.
    pub async fn find_by_name(
        &self,
        name: &NormalizedName,
    ) -> Result<Option<LinkedAccount>, GatewayError> {
        self.store.find_by_name(name).await.map_err(map_lookup)
    }

    /// Create the linked account, exactly once.
    ///
    /// Transient store failures are retried per the injected policy with
    /// linear backoff. A duplicate-key conflict is terminal
    /// [`GatewayError::AlreadyLinked`] — the caller is expected to fall
    /// back to the login path rather than treat it as fatal.
    pub async fn create(
        &self,
        account: NewLinkedAccount,
    ) -> Result<LinkedAccount, GatewayError> {
        let mut last_reason = String::new();
        for attempt in 1..=self.retry.max_attempts {
            match self.store.insert(account.clone()).await {
                Ok(created) => {
                    tracing::info!(
                        external_id = %created.external_id,
                        subject_id = %created.subject_id,
                        trusted_operator = created.is_trusted_operator,
                        "linked account created"
                    );
                    return Ok(created);
                }
                Err(StoreError::DuplicateKey { constraint }) => {
                    tracing::debug!(%constraint, "insert lost uniqueness race");
                    return Err(GatewayError::AlreadyLinked);
                }
                Err(StoreError::Unavailable { reason }) => {
                    return Err(GatewayError::StoreUnavailable { reason });
                }
                Err(StoreError::Transient { reason }) => {
                    last_reason = reason;
                    if attempt < self.retry.max_attempts {
                        let delay = self.retry.backoff(attempt);
                        tracing::warn!(
                            attempt,
                            max_attempts = self.retry.max_attempts,
                            "transient store failure, retrying in {delay:?}: {last_reason}"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
        Err(GatewayError::StoreUnavailable {
            reason: format!(
                "gave up after {} attempts: {last_reason}",
                self.retry.max_attempts
            ),
        })
    }
}

/// Lookups have no retry loop: a transient failure on a read is reported
/// as unavailable and the user simply retries the flow step.
fn map_lookup(err: StoreError) -> GatewayError {
    match err {
        StoreError::DuplicateKey { constraint } => GatewayError::StoreUnavailable {
            reason: format!("unexpected duplicate-key on lookup ({constraint})"),
        },
        StoreError::Transient { reason } | StoreError::Unavailable { reason } => {
            GatewayError::StoreUnavailable { reason }
        }
    }
}

//! The account store seam and its structured error classification.

use async_trait::async_trait;
use hub_core::{ExternalId, NormalizedName, SubjectId};

use crate::account::{LinkedAccount, NewLinkedAccount};

/// Which uniqueness constraint an insert collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueConstraint {
    /// A row already exists for this external id.
    ExternalId,
    /// A row already exists for this subject id.
    SubjectId,
}

impl std::fmt::Display for UniqueConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExternalId => write!(f, "external_id"),
            Self::SubjectId => write!(f, "subject_id"),
        }
    }
}

/// Store failures, classified structurally.
///
/// The split between [`StoreError::DuplicateKey`] and
/// [`StoreError::Transient`] is what the gateway's retry logic keys on,
/// so implementations must classify by error kind from their backend
/// client — not by matching message strings.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the insert. Terminal.
    #[error("duplicate key on {constraint}")]
    DuplicateKey {
        /// The violated constraint.
        constraint: UniqueConstraint,
    },

    /// A transient consistency or authorization window; the same request
    /// may succeed shortly (e.g. a freshly issued session not yet visible
    /// to the store's row-level check). Retryable.
    #[error("transient store failure: {reason}")]
    Transient {
        /// Backend-reported detail.
        reason: String,
    },

    /// The store is down or misconfigured. Terminal.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Backend-reported detail.
        reason: String,
    },
}

/// Async seam over the hosted account record store.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// async tasks behind an `Arc`. The trait is object-safe to support
/// swapping the reference in-memory store for a real backend.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Exact lookup by directory identifier.
    async fn find_by_external_id(
        &self,
        id: &ExternalId,
    ) -> Result<Option<LinkedAccount>, StoreError>;

    /// Exact lookup by internal subject identifier.
    async fn find_by_subject_id(
        &self,
        id: &SubjectId,
    ) -> Result<Option<LinkedAccount>, StoreError>;

    /// Case-insensitive lookup by display name.
    async fn find_by_name(
        &self,
        name: &NormalizedName,
    ) -> Result<Option<LinkedAccount>, StoreError>;

    /// Insert a new account, detecting uniqueness conflicts on both
    /// `external_id` and `subject_id`.
    async fn insert(&self, account: NewLinkedAccount) -> Result<LinkedAccount, StoreError>;
}

//! The user-facing flow error taxonomy.
//!
//! Every variant is an expected, user-actionable outcome the UI renders
//! a specific localized message for. Infrastructure failures are caught
//! at the directory and store boundaries and arrive here already
//! translated to `DirectoryUnavailable` or `StoreUnavailable` — nothing
//! in a flow panics or escapes as an unhandled error.

use hub_directory::DirectoryError;

/// Why a verification flow step did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// No identity exists under the claimed name.
    #[error("no player exists under that name")]
    IdentityNotFound,

    /// The identity exists but its profile is not publicly readable.
    #[error("that player's profile is private")]
    IdentityPrivate,

    /// The directory could not be reached; all retries exhausted.
    #[error("player directory is unavailable: {reason}")]
    DirectoryUnavailable {
        /// Last failure detail observed.
        reason: String,
    },

    /// The issued code is not in the motto yet. The code stays valid.
    #[error("the verification code is not in the motto yet")]
    CodeNotYetPresent,

    /// The identity resolved at issue time but not at confirm time.
    #[error("the player became unresolvable; start over")]
    IdentityBecameUnresolvable,

    /// Password login attempted for an identity with no linked account.
    #[error("that identity is not registered; verify via motto first")]
    NotRegistered,

    /// The credential/secret pair did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A concurrent signup won the race for this identity.
    #[error("that identity is already linked to an account")]
    AlreadyLinked,

    /// The chosen secret is below the minimum length.
    #[error("password must be at least {min} characters")]
    WeakSecret {
        /// Minimum accepted length.
        min: usize,
    },

    /// The secret confirmation did not match.
    #[error("passwords do not match")]
    SecretMismatch,

    /// The verification session expired or was structurally invalid;
    /// the flow restarts from name submission.
    #[error("verification session expired; start over")]
    SessionExpired,

    /// The account store could not serve the request.
    #[error("account store is unavailable: {reason}")]
    StoreUnavailable {
        /// Last failure detail observed.
        reason: String,
    },
}

impl From<DirectoryError> for FlowError {
    fn from(err: DirectoryError) -> Self {
        // Undecodable responses are an infrastructure failure, shown to
        // the user the same way as an outage.
        match err {
            DirectoryError::Unavailable { reason, .. } => Self::DirectoryUnavailable { reason },
            DirectoryError::Deserialization { reason, .. } => {
                Self::DirectoryUnavailable { reason }
            }
        }
    }
}

impl From<hub_accounts::GatewayError> for FlowError {
    fn from(err: hub_accounts::GatewayError) -> Self {
        match err {
            hub_accounts::GatewayError::AlreadyLinked => Self::AlreadyLinked,
            hub_accounts::GatewayError::StoreUnavailable { reason } => {
                Self::StoreUnavailable { reason }
            }
        }
    }
}

impl From<crate::authority::AuthorityError> for FlowError {
    fn from(err: crate::authority::AuthorityError) -> Self {
        match err {
            crate::authority::AuthorityError::InvalidCredentials => Self::InvalidCredentials,
            // A provisioned credential means the identity is linked; the
            // login path is the way forward.
            crate::authority::AuthorityError::CredentialExists => Self::AlreadyLinked,
            crate::authority::AuthorityError::Unavailable { reason } => {
                Self::StoreUnavailable { reason }
            }
        }
    }
}

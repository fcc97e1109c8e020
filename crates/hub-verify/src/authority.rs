//! The session authority seam.
//!
//! The underlying session issuer only understands opaque credential and
//! secret pairs. All directory semantics stay on this side of the trait:
//! the credential handed over is the synthetic `{externalId}@internal`
//! form, never a raw display name, and never shown to the user.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// An established portal session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    /// Access the opaque token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Errors from the session authority.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorityError {
    /// The credential/secret pair did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A credential was provisioned twice — the linking flow lost a race
    /// it should have detected at the account store.
    #[error("credential already provisioned")]
    CredentialExists,

    /// The authority could not serve the request.
    #[error("session authority unavailable: {reason}")]
    Unavailable {
        /// Backend-reported detail.
        reason: String,
    },
}

/// Async seam over the credential-based session issuer.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// async tasks behind an `Arc`.
#[async_trait]
pub trait SessionAuthority: Send + Sync {
    /// Provision a new credential and return a first session.
    async fn signup(&self, credential: &str, secret: &str) -> Result<SessionToken, AuthorityError>;

    /// Authenticate an existing credential.
    async fn login(&self, credential: &str, secret: &str) -> Result<SessionToken, AuthorityError>;
}

/// Salted digest of a secret.
struct StoredSecret {
    salt: [u8; 16],
    digest: [u8; 32],
}

impl StoredSecret {
    fn derive(salt: [u8; 16], secret: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(secret.as_bytes());
        hasher.finalize().into()
    }

    fn new(secret: &str) -> Self {
        let salt: [u8; 16] = rand::random();
        let digest = Self::derive(salt, secret);
        Self { salt, digest }
    }

    fn verify(&self, secret: &str) -> bool {
        let candidate = Self::derive(self.salt, secret);
        self.digest.ct_eq(&candidate).into()
    }
}

/// In-process [`SessionAuthority`] for tests and local development.
///
/// Stores salted SHA-256 digests and compares in constant time. Not a
/// production credential store — the real authority lives behind the
/// trait.
#[derive(Default)]
pub struct MemorySessionAuthority {
    credentials: Mutex<HashMap<String, StoredSecret>>,
}

impl MemorySessionAuthority {
    /// Create an empty authority.
    pub fn new() -> Self {
        Self::default()
    }

    fn issue_token() -> SessionToken {
        SessionToken(Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl SessionAuthority for MemorySessionAuthority {
    async fn signup(&self, credential: &str, secret: &str) -> Result<SessionToken, AuthorityError> {
        let mut credentials = self.credentials.lock();
        if credentials.contains_key(credential) {
            return Err(AuthorityError::CredentialExists);
        }
        credentials.insert(credential.to_string(), StoredSecret::new(secret));
        Ok(Self::issue_token())
    }

    async fn login(&self, credential: &str, secret: &str) -> Result<SessionToken, AuthorityError> {
        let credentials = self.credentials.lock();
        let stored = credentials
            .get(credential)
            .ok_or(AuthorityError::InvalidCredentials)?;
        if stored.verify(secret) {
            Ok(Self::issue_token())
        } else {
            Err(AuthorityError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signup_then_login_roundtrip() {
        let authority = MemorySessionAuthority::new();
        authority.signup("e1@internal", "secret1").await.unwrap();
        authority.login("e1@internal", "secret1").await.unwrap();
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let authority = MemorySessionAuthority::new();
        authority.signup("e1@internal", "secret1").await.unwrap();
        let err = authority.login("e1@internal", "wrong").await.unwrap_err();
        assert_eq!(err, AuthorityError::InvalidCredentials);
    }

    #[tokio::test]
    async fn unknown_credential_is_rejected() {
        let authority = MemorySessionAuthority::new();
        let err = authority.login("nobody@internal", "x").await.unwrap_err();
        assert_eq!(err, AuthorityError::InvalidCredentials);
    }

    #[tokio::test]
    async fn double_signup_is_rejected() {
        let authority = MemorySessionAuthority::new();
        authority.signup("e1@internal", "secret1").await.unwrap();
        let err = authority.signup("e1@internal", "other").await.unwrap_err();
        assert_eq!(err, AuthorityError::CredentialExists);
    }

    #[tokio::test]
    async fn tokens_are_unique_per_session() {
        let authority = MemorySessionAuthority::new();
        authority.signup("e1@internal", "secret1").await.unwrap();
        let a = authority.login("e1@internal", "secret1").await.unwrap();
        let b = authority.login("e1@internal", "secret1").await.unwrap();
        assert_ne!(a, b);
    }
}

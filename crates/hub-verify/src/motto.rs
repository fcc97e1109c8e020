//! The motto verification protocol.
//!
//! A three-step out-of-band proof that a visitor controls an identity:
//!
//! 1. **issue** — resolve the identity, draw a fresh code, hand it to the
//!    user with instructions to publish it in the identity's motto field.
//! 2. **observe** — nothing to do here: the user acts out of band, then
//!    asks for a re-check.
//! 3. **confirm** — resolve the identity again and check whether the
//!    motto contains the *currently* issued code (case-insensitive
//!    substring; surrounding decorative text is tolerated).
//!
//! Reissuing invalidates the prior code for matching purposes, which is
//! what prevents an old, possibly leaked code lingering in a motto from
//! satisfying a fresh verification request.

use std::sync::Arc;

use hub_core::{NormalizedName, VerificationCode};
use hub_directory::{DirectoryClient, ExternalIdentity, Resolution};

use crate::code::generate_code;
use crate::error::FlowError;

/// The result of the issue step: a resolved identity bound to a code.
#[derive(Debug, Clone)]
pub struct IssuedProof {
    /// The identity the code was issued for.
    pub identity: ExternalIdentity,
    /// The code the user must publish.
    pub code: VerificationCode,
}

/// Outcome of the confirm step.
#[derive(Debug, Clone)]
pub enum ConfirmOutcome {
    /// The current code was found in the motto; identity proven.
    Verified(ExternalIdentity),
    /// The motto does not (yet) contain the code. The code stays valid;
    /// the user can publish it and re-check.
    CodeNotPresent,
    /// The identity resolved at issue time but no longer does — it went
    /// private or vanished. Terminal for this session; the caller must
    /// restart from name submission.
    IdentityNoLongerResolvable,
}

/// Drives the proof against the directory.
///
/// Holds no state of its own: the session carries the issued code, the
/// directory client carries the cache.
#[derive(Clone)]
pub struct MottoProtocol {
    directory: Arc<DirectoryClient>,
}

impl MottoProtocol {
    /// Build a protocol driver over a shared directory client.
    pub fn new(directory: Arc<DirectoryClient>) -> Self {
        Self { directory }
    }

    /// Issue step: resolve the claimed name and draw a code for it.
    ///
    /// # Errors
    ///
    /// [`FlowError::IdentityNotFound`] / [`FlowError::IdentityPrivate`]
    /// when the name cannot be resolved, [`FlowError::DirectoryUnavailable`]
    /// when the directory could not be reached at all.
    pub async fn issue(&self, name: &NormalizedName) -> Result<IssuedProof, FlowError> {
        let identity = match self.directory.resolve(name).await? {
            Resolution::Found(identity) => identity,
            Resolution::NotFound => return Err(FlowError::IdentityNotFound),
            Resolution::Private => return Err(FlowError::IdentityPrivate),
        };
        let code = generate_code();
        tracing::debug!(name = %name, code = %code, "verification code issued");
        Ok(IssuedProof { identity, code })
    }

    /// Confirm step: re-resolve and match the currently issued code.
    ///
    /// The 5-minute directory cache bounds how quickly a motto edit
    /// becomes visible here; users re-checking inside the window simply
    /// see [`ConfirmOutcome::CodeNotPresent`] until the entry expires.
    ///
    /// # Errors
    ///
    /// [`FlowError::DirectoryUnavailable`] when the directory could not
    /// be reached; unresolvable identities are a [`ConfirmOutcome`], not
    /// an error, because the caller needs to distinguish them from
    /// transport failure.
    pub async fn confirm(
        &self,
        name: &NormalizedName,
        current_code: &VerificationCode,
    ) -> Result<ConfirmOutcome, FlowError> {
        let identity = match self.directory.resolve(name).await? {
            Resolution::Found(identity) => identity,
            Resolution::NotFound | Resolution::Private => {
                return Ok(ConfirmOutcome::IdentityNoLongerResolvable)
            }
        };
        if current_code.matches_in(&identity.motto) {
            tracing::info!(name = %name, "motto proof accepted");
            Ok(ConfirmOutcome::Verified(identity))
        } else {
            Ok(ConfirmOutcome::CodeNotPresent)
        }
    }
}

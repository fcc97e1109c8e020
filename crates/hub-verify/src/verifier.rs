//! The verification state machine.
//!
//! Orchestrates the directory client, motto protocol, account gateway,
//! and session authority into the four user-facing flows:
//!
//! - **Password login** — returning users with a known secret.
//! - **Motto signup** — first encounter of an identity; proof, then link.
//! - **Motto recovery** — proven identity with an existing account.
//! - **Trusted-operator bypass** — allow-listed names skip the directory
//!   and the motto protocol entirely, for operational access while the
//!   directory is down.
//!
//! The machine holds no cross-request state and takes no in-process
//! locks: two concurrent attempts for the same identity are arbitrated
//! solely by the account store's uniqueness constraint, and the loser of
//! that race is transparently routed to the login path.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use hub_accounts::{AccountGateway, GatewayError, LinkedAccount, NewLinkedAccount};
use hub_core::{synthetic_credential, ExternalId, NormalizedName, SubjectId};
use hub_directory::DirectoryClient;

use crate::authority::{SessionAuthority, SessionToken};
use crate::error::FlowError;
use crate::motto::{ConfirmOutcome, MottoProtocol};
use crate::session::{VerificationSession, VerificationStep};

/// Default minimum secret length.
const DEFAULT_MIN_SECRET_LEN: usize = 6;

/// Default verification-session TTL in minutes.
const DEFAULT_SESSION_TTL_MIN: i64 = 30;

/// Tunables for the verification flows.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Allow-listed operator names (normalized). Injected configuration,
    /// never derived from user input.
    pub trusted_operators: HashSet<NormalizedName>,
    /// Minimum accepted secret length (default: 6).
    pub min_secret_len: usize,
    /// How long a verification session stays usable (default: 30 min).
    pub session_ttl: Duration,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            trusted_operators: HashSet::new(),
            min_secret_len: DEFAULT_MIN_SECRET_LEN,
            session_ttl: Duration::minutes(DEFAULT_SESSION_TTL_MIN),
        }
    }
}

impl VerifierConfig {
    /// Replace the operator allow-list.
    pub fn with_trusted_operators(
        mut self,
        names: impl IntoIterator<Item = NormalizedName>,
    ) -> Self {
        self.trusted_operators = names.into_iter().collect();
        self
    }
}

/// What a successful confirm step resolved to.
#[derive(Debug, Clone)]
pub enum ConfirmedSession {
    /// First encounter: no account is linked to this identity yet. The
    /// flow continues with secret collection and account creation.
    NewIdentity {
        /// The proven directory identity.
        external_id: ExternalId,
        /// Display name snapshot (directory casing).
        display_name: String,
        /// Whether the proof came from the operator bypass.
        is_trusted_operator: bool,
    },
    /// The identity already has a linked account; the flow continues
    /// with an existing-secret login.
    ExistingAccount {
        /// The linked account on file.
        account: LinkedAccount,
    },
}

/// The verification state machine.
///
/// Shareable across tasks; every method is a single flow step taking the
/// machine only by `&self`.
#[derive(Clone)]
pub struct Verifier {
    motto: MottoProtocol,
    accounts: AccountGateway,
    authority: Arc<dyn SessionAuthority>,
    config: VerifierConfig,
}

impl Verifier {
    /// Wire a machine from its collaborators.
    pub fn new(
        directory: Arc<DirectoryClient>,
        accounts: AccountGateway,
        authority: Arc<dyn SessionAuthority>,
        config: VerifierConfig,
    ) -> Self {
        Self {
            motto: MottoProtocol::new(directory),
            accounts,
            authority,
            config,
        }
    }

    fn is_trusted_operator(&self, name: &NormalizedName) -> bool {
        self.config.trusted_operators.contains(name)
    }

    /// Password login for a returning user.
    ///
    /// Allow-listed operator names never touch the directory. Everyone
    /// else is looked up by display name, case-insensitively, in the
    /// account store.
    ///
    /// # Errors
    ///
    /// [`FlowError::NotRegistered`] when no account is linked (the motto
    /// flow is the way in), [`FlowError::InvalidCredentials`] on a bad
    /// secret.
    pub async fn login_with_password(
        &self,
        name: &str,
        secret: &str,
    ) -> Result<SessionToken, FlowError> {
        let normalized = normalize(name)?;

        let account = if self.is_trusted_operator(&normalized) {
            let external_id = ExternalId::for_operator(&normalized);
            self.accounts.find_by_external_id(&external_id).await?
        } else {
            self.accounts.find_by_name(&normalized).await?
        };
        let account = account.ok_or(FlowError::NotRegistered)?;

        let token = self
            .authority
            .login(&synthetic_credential(&account.external_id), secret)
            .await?;
        tracing::info!(name = %normalized, "password login complete");
        Ok(token)
    }

    /// Open a verification session for a claimed name and issue a code.
    ///
    /// Allow-listed operator names get a bypass session: proof accepted
    /// on allow-list authority, no directory call, no code.
    ///
    /// Calling this again for the same name reissues: the new session's
    /// code is the only one confirmation will accept.
    ///
    /// # Errors
    ///
    /// [`FlowError::IdentityNotFound`], [`FlowError::IdentityPrivate`],
    /// [`FlowError::DirectoryUnavailable`].
    pub async fn begin_motto_verification(
        &self,
        name: &str,
    ) -> Result<VerificationSession, FlowError> {
        let normalized = normalize(name)?;

        if self.is_trusted_operator(&normalized) {
            tracing::info!(name = %normalized, "operator bypass session opened");
            return Ok(VerificationSession::begin_operator(normalized, name.trim()));
        }

        let proof = self.motto.issue(&normalized).await?;
        let mut session = VerificationSession::begin(normalized, proof.identity.display_name.clone());
        session.issue(proof.identity.external_id.clone(), proof.code);
        Ok(session)
    }

    /// Re-check the motto and, on success, resolve where the flow goes
    /// next: account creation or existing-account login.
    ///
    /// # Errors
    ///
    /// [`FlowError::SessionExpired`] for stale or tampered sessions,
    /// [`FlowError::CodeNotYetPresent`] while the motto lacks the code,
    /// [`FlowError::IdentityBecameUnresolvable`] when the identity
    /// vanished or went private since issue.
    pub async fn confirm_motto_verification(
        &self,
        session: &mut VerificationSession,
    ) -> Result<ConfirmedSession, FlowError> {
        // Sessions round-trip through client-local storage; distrust
        // both their age and their shape.
        if session.is_expired(self.config.session_ttl) || !session.is_consistent() {
            return Err(FlowError::SessionExpired);
        }

        let external_id = if session.operator_bypass {
            session
                .external_id
                .clone()
                .ok_or(FlowError::SessionExpired)?
        } else {
            if session.step < VerificationStep::CodeIssued {
                return Err(FlowError::SessionExpired);
            }
            let code = session
                .issued_code
                .clone()
                .ok_or(FlowError::SessionExpired)?;
            let identity = match self.motto.confirm(&session.claimed_name, &code).await? {
                ConfirmOutcome::Verified(identity) => identity,
                ConfirmOutcome::CodeNotPresent => return Err(FlowError::CodeNotYetPresent),
                ConfirmOutcome::IdentityNoLongerResolvable => {
                    return Err(FlowError::IdentityBecameUnresolvable)
                }
            };
            // The code was issued for one specific id. If the name now
            // resolves to a different identity, the proof proves nothing.
            if session.external_id.as_ref() != Some(&identity.external_id) {
                return Err(FlowError::IdentityBecameUnresolvable);
            }
            session.accept_proof();
            identity.external_id
        };

        match self.accounts.find_by_external_id(&external_id).await? {
            Some(account) => Ok(ConfirmedSession::ExistingAccount { account }),
            None => {
                session.await_password();
                Ok(ConfirmedSession::NewIdentity {
                    external_id,
                    display_name: session.display_name.clone(),
                    is_trusted_operator: session.operator_bypass,
                })
            }
        }
    }

    /// Finish the flow: create the link and first session for a new
    /// identity, or log an existing account in.
    ///
    /// A create that loses the uniqueness race falls back to the login
    /// path with the provided secret rather than erroring out, since the
    /// usual cause is the same user double-submitting.
    ///
    /// # Errors
    ///
    /// [`FlowError::WeakSecret`] / [`FlowError::SecretMismatch`] for new
    /// identities, [`FlowError::InvalidCredentials`] on a bad existing
    /// secret, [`FlowError::AlreadyLinked`] when the race loser's secret
    /// does not match the winner's account either.
    pub async fn complete_linking(
        &self,
        confirmed: ConfirmedSession,
        secret: &str,
        confirm_secret: &str,
    ) -> Result<SessionToken, FlowError> {
        match confirmed {
            ConfirmedSession::ExistingAccount { account } => {
                // Existing accounts authenticate with their current
                // secret; the confirmation field is not consulted.
                let token = self
                    .authority
                    .login(&synthetic_credential(&account.external_id), secret)
                    .await?;
                tracing::info!(external_id = %account.external_id, "recovery login complete");
                Ok(token)
            }
            ConfirmedSession::NewIdentity {
                external_id,
                display_name,
                is_trusted_operator,
            } => {
                if secret.chars().count() < self.config.min_secret_len {
                    return Err(FlowError::WeakSecret {
                        min: self.config.min_secret_len,
                    });
                }
                if secret != confirm_secret {
                    return Err(FlowError::SecretMismatch);
                }

                let credential = synthetic_credential(&external_id);
                let created = self
                    .accounts
                    .create(NewLinkedAccount {
                        external_id,
                        display_name,
                        subject_id: SubjectId::new(),
                        is_trusted_operator,
                    })
                    .await;
                match created {
                    Ok(_) => {
                        let token = self.authority.signup(&credential, secret).await?;
                        Ok(token)
                    }
                    Err(GatewayError::AlreadyLinked) => {
                        // Lost the race — almost always our own retry.
                        // If the secret matches the winning account's
                        // credential this still ends in a session.
                        tracing::debug!("create lost race, falling back to login");
                        self.authority
                            .login(&credential, secret)
                            .await
                            .map_err(|err| match err {
                                crate::authority::AuthorityError::InvalidCredentials => {
                                    FlowError::AlreadyLinked
                                }
                                other => other.into(),
                            })
                    }
                    Err(other) => Err(other.into()),
                }
            }
        }
    }
}

/// Fold raw user input into a lookup key. Unusable input (empty, absurdly
/// long) is reported the same way as a name the directory has never heard
/// of.
fn normalize(name: &str) -> Result<NormalizedName, FlowError> {
    NormalizedName::new(name).map_err(|_| FlowError::IdentityNotFound)
}

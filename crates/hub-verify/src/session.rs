//! The ephemeral state of one verification attempt.
//!
//! A [`VerificationSession`] is an explicit, serializable value so the UI
//! layer can park it in client-local storage across a page reload. It is
//! not a durable record: it expires after a TTL, is discarded on success
//! or restart, and is never reused across a different claimed name.

use chrono::{DateTime, Duration, Utc};
use hub_core::{ExternalId, NormalizedName, VerificationCode};
use serde::{Deserialize, Serialize};

/// Progress marker of a verification attempt.
///
/// Ordering is meaningful: the step only ever advances within one
/// session, and an issued code is present exactly from
/// [`VerificationStep::CodeIssued`] onward (operator-bypass sessions
/// excepted — they never hold a code).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStep {
    /// A display name has been claimed; nothing is proven yet.
    NameSubmitted,
    /// A code is issued and awaiting out-of-band publication.
    CodeIssued,
    /// The code was observed in the motto (or the operator bypass
    /// applied); the identity is proven.
    ProofAccepted,
    /// Awaiting secret collection to finish linking.
    PasswordPending,
}

/// One in-progress verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSession {
    /// Case-folded name this attempt is bound to. Immutable for the
    /// session's lifetime — a different name means a fresh session.
    pub claimed_name: NormalizedName,
    /// Display name as the user typed it (for UI echo only).
    pub display_name: String,
    /// Directory identity, once resolved.
    pub external_id: Option<ExternalId>,
    /// The currently issued code. Reissuing replaces it; only the
    /// current code ever satisfies confirmation.
    pub issued_code: Option<VerificationCode>,
    /// Progress marker.
    pub step: VerificationStep,
    /// Whether this session was opened through the trusted-operator
    /// bypass (no directory resolution, no code).
    pub operator_bypass: bool,
    /// Creation time, for TTL checks.
    pub started_at: DateTime<Utc>,
}

impl VerificationSession {
    /// Open a fresh session for a claimed name.
    pub fn begin(claimed_name: NormalizedName, display_name: impl Into<String>) -> Self {
        Self {
            claimed_name,
            display_name: display_name.into(),
            external_id: None,
            issued_code: None,
            step: VerificationStep::NameSubmitted,
            operator_bypass: false,
            started_at: Utc::now(),
        }
    }

    /// Open a session through the operator bypass: the identity is taken
    /// on allow-list authority, so the proof is accepted immediately and
    /// no code ever exists.
    pub fn begin_operator(claimed_name: NormalizedName, display_name: impl Into<String>) -> Self {
        let external_id = ExternalId::for_operator(&claimed_name);
        Self {
            claimed_name,
            display_name: display_name.into(),
            external_id: Some(external_id),
            issued_code: None,
            step: VerificationStep::ProofAccepted,
            operator_bypass: true,
            started_at: Utc::now(),
        }
    }

    /// Bind a resolved identity and issued code; advances to
    /// [`VerificationStep::CodeIssued`]. Calling this again reissues:
    /// the previous code stops matching from this moment.
    pub fn issue(&mut self, external_id: ExternalId, code: VerificationCode) {
        self.external_id = Some(external_id);
        self.issued_code = Some(code);
        self.step = VerificationStep::CodeIssued;
    }

    /// Mark the out-of-band proof as observed.
    pub fn accept_proof(&mut self) {
        self.step = VerificationStep::ProofAccepted;
    }

    /// Advance to secret collection.
    pub fn await_password(&mut self) {
        self.step = VerificationStep::PasswordPending;
    }

    /// Whether this session has outlived `ttl`.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        Utc::now() - self.started_at >= ttl
    }

    /// Structural consistency check, applied defensively to sessions
    /// that round-tripped through client-local storage: a code must be
    /// present exactly from `CodeIssued` onward (never for bypass
    /// sessions), and any step past `NameSubmitted` needs a resolved id.
    pub fn is_consistent(&self) -> bool {
        let code_expected =
            !self.operator_bypass && self.step >= VerificationStep::CodeIssued;
        if self.issued_code.is_some() != code_expected {
            return false;
        }
        if self.step > VerificationStep::NameSubmitted && self.external_id.is_none() {
            return false;
        }
        true
    }
}

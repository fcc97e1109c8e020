//! Linked account records.

use chrono::{DateTime, Utc};
use hub_core::{ExternalId, NormalizedName, SubjectId};
use serde::{Deserialize, Serialize};

/// The durable binding between an external identity and a portal subject.
///
/// Created exactly once per external identity, by the verification flow,
/// after motto-proof acceptance or trusted-operator bypass. Never deleted
/// by this subsystem; the only mutation ever applied is display-name
/// resynchronization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAccount {
    /// Unique, immutable directory identifier.
    pub external_id: ExternalId,
    /// Display name snapshot taken at link time, original casing.
    pub display_name: String,
    /// Unique, immutable internal session subject.
    pub subject_id: SubjectId,
    /// Whether this account was created through the operator bypass.
    /// Set at creation only.
    pub is_trusted_operator: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl LinkedAccount {
    /// Case-folded lookup key for this account's display name.
    pub fn name_key(&self) -> Option<NormalizedName> {
        NormalizedName::new(&self.display_name).ok()
    }
}

/// Fields of an account about to be inserted.
///
/// Separate from [`LinkedAccount`] so that `created_at` is assigned by
/// the store at insert time, not by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLinkedAccount {
    /// Directory identifier to bind.
    pub external_id: ExternalId,
    /// Display name snapshot, original casing.
    pub display_name: String,
    /// Internal subject to bind.
    pub subject_id: SubjectId,
    /// Operator-bypass flag.
    pub is_trusted_operator: bool,
}

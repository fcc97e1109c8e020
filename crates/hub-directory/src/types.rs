//! Directory response types and wire decoding.

use chrono::{DateTime, Utc};
use hub_core::ExternalId;
use serde::{Deserialize, Serialize};

/// A public player profile as resolved from the external directory.
///
/// Read-only and never persisted beyond the cache TTL. The `motto` field
/// is the free-text status line the identity's owner controls — the
/// out-of-band proof channel for motto verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    /// Opaque stable identifier assigned by the directory.
    pub external_id: ExternalId,
    /// Display name with the owner's original casing preserved.
    pub display_name: String,
    /// Free-text public status field (the motto).
    pub motto: String,
    /// Whether the player is currently online.
    pub is_online: bool,
    /// Whether the profile is publicly readable.
    pub is_profile_public: bool,
    /// When the identity joined, if the directory reports it.
    pub member_since: Option<DateTime<Utc>>,
}

impl ExternalIdentity {
    /// Degraded placeholder for a name the directory could not serve.
    ///
    /// Keeps list pages renderable during a directory outage. Flagged
    /// offline and private so it can never satisfy verification.
    pub fn degraded_fallback(display_name: &str) -> Self {
        // Local-only id namespace, never confusable with a directory id.
        let external_id = ExternalId::new(format!("unresolved:{}", display_name.to_lowercase()))
            .expect("prefix guarantees non-empty");
        Self {
            external_id,
            display_name: format!("{display_name} (unavailable)"),
            motto: String::new(),
            is_online: false,
            is_profile_public: false,
            member_since: None,
        }
    }
}

/// Outcome of resolving a display name against the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// The profile exists and is publicly readable.
    Found(ExternalIdentity),
    /// No identity exists under this name (HTTP 404). Terminal.
    NotFound,
    /// The identity exists but its profile is not public (HTTP 403). Terminal.
    Private,
}

/// Raw profile document as the directory serves it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireProfile {
    unique_id: String,
    name: String,
    #[serde(default)]
    motto: String,
    #[serde(default)]
    online: bool,
    #[serde(default)]
    profile_visible: bool,
    #[serde(default)]
    member_since: Option<DateTime<Utc>>,
}

/// The directory returns either a single profile object or a one-element
/// array, depending on the endpoint revision. Both shapes must decode.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireResponse {
    One(WireProfile),
    Many(Vec<WireProfile>),
}

impl WireResponse {
    /// Collapse both shapes to the first profile, if any.
    pub(crate) fn into_profile(self) -> Option<WireProfile> {
        match self {
            Self::One(profile) => Some(profile),
            Self::Many(profiles) => profiles.into_iter().next(),
        }
    }
}

impl WireProfile {
    /// Map the wire document into the domain type.
    ///
    /// Returns `None` when the document is unusable (empty id), which the
    /// client treats as a decode failure rather than a resolved identity.
    pub(crate) fn into_identity(self) -> Option<ExternalIdentity> {
        let external_id = ExternalId::new(self.unique_id).ok()?;
        Some(ExternalIdentity {
            external_id,
            display_name: self.name,
            motto: self.motto,
            is_online: self.online,
            is_profile_public: self.profile_visible,
            member_since: self.member_since,
        })
    }
}

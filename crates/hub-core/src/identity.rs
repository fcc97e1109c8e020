//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the Hub Stack.
//!
//! ## Validation
//!
//! String-based identifiers ([`NormalizedName`], [`VerificationCode`])
//! validate format at construction time. UUID-based identifiers
//! ([`SubjectId`]) are always valid by construction.
//!
//! ## Case folding
//!
//! The external player directory is case-preserving but case-insensitive
//! for lookup. Every code path that uses a display name as a key must go
//! through [`NormalizedName`], which folds to lowercase exactly once at
//! construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Maximum display-name length accepted by the directory.
const MAX_NAME_LEN: usize = 32;

/// Number of random symbols following the `HUB-` prefix.
pub const CODE_SYMBOLS: usize = 5;

/// Prefix that namespaces every verification code.
pub const CODE_PREFIX: &str = "HUB-";

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor so that invalid values are
/// rejected at deserialization time — not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// UUID-based identifiers (always valid by construction)
// ---------------------------------------------------------------------------

/// Internal session subject identifier.
///
/// Identifies the portal-side account subject a verified external identity
/// is linked to. Opaque to the external directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(Uuid);

impl SubjectId {
    /// Create a new random subject identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a subject identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SubjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Self)
    }
}

// ---------------------------------------------------------------------------
// String-based identifiers (validated at construction)
// ---------------------------------------------------------------------------

/// Opaque stable identifier assigned by the external player directory.
///
/// Treated as a black box: never parsed, only compared for equality and
/// stored as the unique key of a linked account. Trusted-operator bypass
/// identities use a locally synthesized value that cannot collide with
/// directory-issued ids (directory ids never carry the `op:` prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExternalId(String);

impl_validating_deserialize!(ExternalId);

impl ExternalId {
    /// Create an external id from a directory-issued value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyExternalId`] if the value is empty
    /// or whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(ValidationError::EmptyExternalId);
        }
        Ok(Self(s))
    }

    /// Synthesize a local external id for an allow-listed operator.
    ///
    /// Deterministic per normalized name, unique within the local account
    /// store, and distinguishable from directory-issued ids by prefix.
    pub fn for_operator(name: &NormalizedName) -> Self {
        Self(format!("op:{}", name.as_str()))
    }

    /// Whether this id was synthesized by the operator bypass rather than
    /// issued by the directory.
    pub fn is_operator_local(&self) -> bool {
        self.0.starts_with("op:")
    }

    /// Access the id string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExternalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Case-folded display-name lookup key.
///
/// The directory preserves the case of display names but resolves them
/// case-insensitively. Folding happens exactly once, here, so cache keys,
/// store lookups, and allow-list membership all agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NormalizedName(String);

impl_validating_deserialize!(NormalizedName);

impl NormalizedName {
    /// Create a normalized name from any display-name spelling.
    ///
    /// Trims surrounding whitespace and folds to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] for empty or whitespace-only
    /// input, [`ValidationError::NameTooLong`] beyond 32 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::NameTooLong {
                len: trimmed.chars().count(),
                max: MAX_NAME_LEN,
            });
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Access the lowercase key value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A motto verification code: `HUB-` followed by five uppercase base-36
/// symbols (`A-Z0-9`).
///
/// Codes are scoped to a single verification attempt and matched against
/// one specific identity's motto, so global uniqueness is not required.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VerificationCode(String);

impl_validating_deserialize!(VerificationCode);

impl VerificationCode {
    /// Create a code from a string, validating the `HUB-XXXXX` format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCode`] if the value does not
    /// match `^HUB-[A-Z0-9]{5}$`.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let suffix = match s.strip_prefix(CODE_PREFIX) {
            Some(rest) => rest,
            None => return Err(ValidationError::InvalidCode(s)),
        };
        if suffix.len() != CODE_SYMBOLS
            || !suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::InvalidCode(s));
        }
        Ok(Self(s))
    }

    /// Case-insensitive substring check: does `text` contain this code?
    ///
    /// Mottoes routinely carry decorative text around the code, so an
    /// exact match would reject legitimate proofs.
    pub fn matches_in(&self, text: &str) -> bool {
        text.to_uppercase().contains(&self.0)
    }

    /// Access the code string value (always uppercase).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Synthetic credential mapping
// ---------------------------------------------------------------------------

/// Map an external identity to the synthetic credential namespace used by
/// the session authority.
///
/// The session authority only understands opaque credential/secret pairs;
/// the `@internal` suffix keeps directory semantics out of it. Never shown
/// to the user.
pub fn synthetic_credential(external_id: &ExternalId) -> String {
    format!("{}@internal", external_id.as_str())
}

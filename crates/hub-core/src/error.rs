//! Shared validation errors for domain-primitive construction.

/// Errors raised when a domain-primitive newtype rejects its input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A display name was empty or whitespace-only.
    #[error("display name is empty")]
    EmptyName,

    /// A display name exceeded the directory's maximum length.
    #[error("display name too long: {len} characters (max {max})")]
    NameTooLong {
        /// Length of the rejected name.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// An external identifier was empty.
    #[error("external id is empty")]
    EmptyExternalId,

    /// A verification code did not match the `HUB-XXXXX` format.
    #[error("invalid verification code: {0:?}")]
    InvalidCode(String),
}

//! Directory client error types.

/// Errors from directory API calls.
///
/// Note that "profile does not exist" (404) and "profile is private" (403)
/// are not errors — they are terminal [`Resolution`](crate::Resolution)
/// outcomes. Only transport-level and protocol-level failures land here.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// All retry attempts were exhausted against transient failures.
    #[error("directory unavailable after {attempts} attempts: {reason}")]
    Unavailable {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Description of the last failure observed.
        reason: String,
    },

    /// The response body did not match any known shape.
    #[error("failed to decode directory response for {name:?}: {reason}")]
    Deserialization {
        /// The queried (normalized) name.
        name: String,
        /// Decode failure detail.
        reason: String,
    },
}

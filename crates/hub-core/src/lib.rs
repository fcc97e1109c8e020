//! # hub-core — Foundational Types for the Hub Stack Portal
//!
//! Domain-primitive newtypes shared by every crate in the workspace.
//! Each identifier is a distinct type — you cannot pass an [`ExternalId`]
//! where a [`SubjectId`] is expected, and a display name used as a lookup
//! key must first be case-folded into a [`NormalizedName`].
//!
//! ## Validation
//!
//! String-based identifiers ([`NormalizedName`], [`VerificationCode`])
//! validate format at construction time. UUID-based identifiers
//! ([`SubjectId`]) are always valid by construction.

pub mod error;
pub mod identity;

pub use error::ValidationError;
pub use identity::{
    synthetic_credential, ExternalId, NormalizedName, SubjectId, VerificationCode, CODE_PREFIX,
    CODE_SYMBOLS,
};

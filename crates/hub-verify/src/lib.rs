//! # hub-verify — Identity Verification & Account Linking
//!
//! The trust core of the portal: proves that a visitor controls a given
//! in-game identity and binds that identity to a portal account, exactly
//! once.
//!
//! ## Components
//!
//! - [`code`]: short, namespaced verification codes (`HUB-XXXXX`).
//! - [`session`]: the ephemeral, serializable state of one verification
//!   attempt.
//! - [`motto`]: the out-of-band proof protocol — publish an issued code
//!   in the player-controlled motto field, then re-fetch and match.
//! - [`authority`]: the seam to the credential-based session issuer.
//! - [`verifier`]: the state machine orchestrating the four user-facing
//!   flows (password login, motto signup, motto recovery, trusted-operator
//!   bypass).
//!
//! ## Failure model
//!
//! Every expected outcome is a typed [`FlowError`] variant the UI renders
//! a specific message for. No step is fatal: each failure returns the
//! caller to a state from which submitting a name restarts cleanly.

pub mod authority;
pub mod code;
pub mod error;
pub mod motto;
pub mod session;
pub mod verifier;

pub use authority::{AuthorityError, MemorySessionAuthority, SessionAuthority, SessionToken};
pub use code::generate_code;
pub use error::FlowError;
pub use motto::{ConfirmOutcome, IssuedProof, MottoProtocol};
pub use session::{VerificationSession, VerificationStep};
pub use verifier::{ConfirmedSession, Verifier, VerifierConfig};

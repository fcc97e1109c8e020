//! # hub-directory — Player Directory Client
//!
//! Typed HTTP client over the external read-only player-directory API.
//! Resolves a claimed display name to a public profile, normalizing the
//! provider's response shapes and failure modes into [`Resolution`].
//!
//! ## Architecture
//!
//! A single [`DirectoryClient`] wraps a `reqwest::Client` with the
//! directory base URL, a bounded per-request timeout, and a shared
//! 5-minute TTL cache keyed by the case-folded name. The client is
//! `Send + Sync` and designed to be shared via `Arc` across async tasks.
//!
//! ## Error Handling
//!
//! HTTP 404 and 403 are terminal resolution outcomes ([`Resolution::NotFound`],
//! [`Resolution::Private`]), not errors. Transport failures and 5xx
//! responses are retried with exponential backoff; exhaustion surfaces as
//! [`DirectoryError::Unavailable`].
//!
//! ## Authority
//!
//! This crate has read-only authority: it never creates or mutates
//! accounts. Its only side effect is cache population.

mod cache;
mod client;
mod config;
mod error;
mod retry;
mod types;

pub use client::DirectoryClient;
pub use config::{ConfigError, DirectoryConfig};
pub use error::DirectoryError;
pub use types::{ExternalIdentity, Resolution};

//! # hub-accounts — Account Store Gateway
//!
//! Durable one-to-one linkage between an external directory identity and
//! a portal account subject.
//!
//! ## Architecture
//!
//! The [`AccountStore`] trait abstracts over the hosted record store;
//! production deployments implement it against the real backend, tests
//! and local development use [`MemoryAccountStore`]. The
//! [`AccountGateway`] wraps a store with a bounded, injected
//! [`RetryPolicy`] and maps store failures into the caller-facing
//! [`GatewayError`] taxonomy.
//!
//! ## Correctness
//!
//! Uniqueness of `external_id` and `subject_id` is enforced by the store
//! itself, not by application logic: concurrent signup attempts for the
//! same identity are expected under retry, and the losing insert must
//! surface as [`GatewayError::AlreadyLinked`] rather than producing a
//! second row.

mod account;
mod gateway;
mod memory;
mod store;

pub use account::{LinkedAccount, NewLinkedAccount};
pub use gateway::{AccountGateway, GatewayError, RetryPolicy};
pub use memory::MemoryAccountStore;
pub use store::{AccountStore, StoreError, UniqueConstraint};

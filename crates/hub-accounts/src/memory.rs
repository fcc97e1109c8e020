//! In-memory reference store.
//!
//! Enforces the same uniqueness semantics as the hosted backend under a
//! single lock, which makes it the fixture for gateway and flow tests and
//! a usable backend for local development. Scripted failures can be
//! queued to exercise the gateway's retry classification.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::Utc;
use hub_core::{ExternalId, NormalizedName, SubjectId};
use parking_lot::Mutex;

use crate::account::{LinkedAccount, NewLinkedAccount};
use crate::store::{AccountStore, StoreError, UniqueConstraint};

#[derive(Default)]
struct Inner {
    rows: Vec<LinkedAccount>,
    scripted_failures: VecDeque<StoreError>,
}

/// In-process [`AccountStore`] with real uniqueness enforcement.
#[derive(Default)]
pub struct MemoryAccountStore {
    inner: Mutex<Inner>,
}

impl MemoryAccountStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a failure to be returned by the next `insert` call instead
    /// of touching the rows. Failures are consumed in FIFO order.
    pub fn script_failure(&self, err: StoreError) {
        self.inner.lock().scripted_failures.push_back(err);
    }

    /// Number of rows currently stored.
    pub fn row_count(&self) -> usize {
        self.inner.lock().rows.len()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_external_id(
        &self,
        id: &ExternalId,
    ) -> Result<Option<LinkedAccount>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner.rows.iter().find(|r| &r.external_id == id).cloned())
    }

    async fn find_by_subject_id(
        &self,
        id: &SubjectId,
    ) -> Result<Option<LinkedAccount>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner.rows.iter().find(|r| &r.subject_id == id).cloned())
    }

    async fn find_by_name(
        &self,
        name: &NormalizedName,
    ) -> Result<Option<LinkedAccount>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .rows
            .iter()
            .find(|r| r.name_key().as_ref() == Some(name))
            .cloned())
    }

    async fn insert(&self, account: NewLinkedAccount) -> Result<LinkedAccount, StoreError> {
        let mut inner = self.inner.lock();
        if let Some(err) = inner.scripted_failures.pop_front() {
            return Err(err);
        }
        if inner.rows.iter().any(|r| r.external_id == account.external_id) {
            return Err(StoreError::DuplicateKey {
                constraint: UniqueConstraint::ExternalId,
            });
        }
        if inner.rows.iter().any(|r| r.subject_id == account.subject_id) {
            return Err(StoreError::DuplicateKey {
                constraint: UniqueConstraint::SubjectId,
            });
        }
        let row = LinkedAccount {
            external_id: account.external_id,
            display_name: account.display_name,
            subject_id: account.subject_id,
            is_trusted_operator: account.is_trusted_operator,
            created_at: Utc::now(),
        };
        inner.rows.push(row.clone());
        Ok(row)
    }
}

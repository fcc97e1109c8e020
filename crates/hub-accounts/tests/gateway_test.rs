//! Gateway behavior tests: retry classification, terminal duplicates,
//! and the concurrent-create race the uniqueness constraint arbitrates.

use std::sync::Arc;
use std::time::Duration;

use hub_accounts::{
    AccountGateway, GatewayError, MemoryAccountStore, NewLinkedAccount, RetryPolicy, StoreError,
};
use hub_core::{ExternalId, NormalizedName, SubjectId};

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 5,
        base_delay: Duration::from_millis(1),
    }
}

fn new_account(external: &str, name: &str) -> NewLinkedAccount {
    NewLinkedAccount {
        external_id: ExternalId::new(external).unwrap(),
        display_name: name.to_string(),
        subject_id: SubjectId::new(),
        is_trusted_operator: false,
    }
}

#[tokio::test]
async fn create_rides_out_transient_failures() {
    let store = Arc::new(MemoryAccountStore::new());
    for _ in 0..3 {
        store.script_failure(StoreError::Transient {
            reason: "row-level check lagging".to_string(),
        });
    }
    let gateway = AccountGateway::new(store.clone(), fast_policy());

    let created = gateway.create(new_account("e1", "Alice")).await.unwrap();
    assert_eq!(created.display_name, "Alice");
    assert_eq!(store.row_count(), 1);
}

#[tokio::test]
async fn create_gives_up_after_max_attempts() {
    let store = Arc::new(MemoryAccountStore::new());
    for _ in 0..5 {
        store.script_failure(StoreError::Transient {
            reason: "still lagging".to_string(),
        });
    }
    let gateway = AccountGateway::new(store.clone(), fast_policy());

    let err = gateway.create(new_account("e1", "Alice")).await.unwrap_err();
    assert!(matches!(err, GatewayError::StoreUnavailable { .. }));
    assert_eq!(store.row_count(), 0);
}

#[tokio::test]
async fn duplicate_key_is_terminal_not_retried() {
    let store = Arc::new(MemoryAccountStore::new());
    let gateway = AccountGateway::new(store.clone(), fast_policy());
    gateway.create(new_account("e1", "Alice")).await.unwrap();

    let err = gateway.create(new_account("e1", "alice")).await.unwrap_err();
    assert_eq!(err, GatewayError::AlreadyLinked);
    assert_eq!(store.row_count(), 1);
}

#[tokio::test]
async fn unavailable_is_terminal_not_retried() {
    let store = Arc::new(MemoryAccountStore::new());
    store.script_failure(StoreError::Unavailable {
        reason: "store down".to_string(),
    });
    let gateway = AccountGateway::new(store.clone(), fast_policy());

    let err = gateway.create(new_account("e1", "Alice")).await.unwrap_err();
    assert!(matches!(err, GatewayError::StoreUnavailable { .. }));
    // One scripted failure, zero retries: the store saw a single insert.
    assert_eq!(store.row_count(), 0);
}

#[tokio::test]
async fn concurrent_creates_yield_one_row_and_one_already_linked() {
    let store = Arc::new(MemoryAccountStore::new());
    let gateway = AccountGateway::new(store.clone(), fast_policy());

    let a = {
        let gateway = gateway.clone();
        tokio::spawn(async move { gateway.create(new_account("e1", "Alice")).await })
    };
    let b = {
        let gateway = gateway.clone();
        tokio::spawn(async move { gateway.create(new_account("e1", "Alice")).await })
    };
    let (ra, rb) = (a.await.unwrap(), b.await.unwrap());

    let winners = [&ra, &rb].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one create must win");
    let loser = [ra, rb].into_iter().find(|r| r.is_err()).unwrap();
    assert_eq!(loser.unwrap_err(), GatewayError::AlreadyLinked);
    assert_eq!(store.row_count(), 1);
}

#[tokio::test]
async fn lookups_are_case_insensitive_by_name() {
    let store = Arc::new(MemoryAccountStore::new());
    let gateway = AccountGateway::new(store, fast_policy());
    gateway.create(new_account("e1", "AlIcE")).await.unwrap();

    let found = gateway
        .find_by_name(&NormalizedName::new("alice").unwrap())
        .await
        .unwrap();
    assert!(found.is_some());
    assert_eq!(found.unwrap().display_name, "AlIcE");
}

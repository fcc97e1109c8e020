//! End-to-end flow tests: the four verification flows wired against a
//! mock directory, the in-memory account store, and the in-memory
//! session authority.
//!
//! The directory cache TTL is zeroed so motto edits made "out of band"
//! by the test are visible to the next confirm immediately.

use std::sync::Arc;

use hub_accounts::{
    AccountGateway, AccountStore, MemoryAccountStore, NewLinkedAccount, RetryPolicy, StoreError,
    UniqueConstraint,
};
use hub_core::{synthetic_credential, ExternalId, NormalizedName, SubjectId};
use hub_directory::{DirectoryClient, DirectoryConfig};
use hub_verify::{
    ConfirmedSession, FlowError, MemorySessionAuthority, SessionAuthority, Verifier,
    VerifierConfig, VerificationStep,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    server: MockServer,
    store: Arc<MemoryAccountStore>,
    authority: Arc<MemorySessionAuthority>,
    verifier: Verifier,
}

async fn harness_with(config: VerifierConfig) -> Harness {
    let server = MockServer::start().await;
    let directory_config = DirectoryConfig::new(server.uri())
        .unwrap()
        .with_timeout_secs(5)
        .with_cache_ttl_secs(0);
    let directory = Arc::new(DirectoryClient::new(directory_config).unwrap());
    let store = Arc::new(MemoryAccountStore::new());
    let gateway = AccountGateway::new(
        store.clone(),
        RetryPolicy {
            max_attempts: 5,
            base_delay: std::time::Duration::from_millis(1),
        },
    );
    let authority = Arc::new(MemorySessionAuthority::new());
    let verifier = Verifier::new(directory, gateway, authority.clone(), config);
    Harness {
        server,
        store,
        authority,
        verifier,
    }
}

async fn harness() -> Harness {
    harness_with(VerifierConfig::default()).await
}

fn profile_body(motto: &str) -> serde_json::Value {
    serde_json::json!({
        "uniqueId": "hhus-e1",
        "name": "Alice",
        "motto": motto,
        "online": true,
        "profileVisible": true
    })
}

/// Mount a profile response for `alice` that answers `times` requests.
async fn mount_alice(server: &MockServer, motto: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("name", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body(motto)))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

// ── Scenario A: new user, full motto flow ───────────────────────────

#[tokio::test]
async fn new_user_completes_the_full_motto_flow() {
    let h = harness().await;

    // begin + first confirm see the untouched motto.
    mount_alice(&h.server, "gamer 4 life", 2).await;

    let mut session = h.verifier.begin_motto_verification("Alice").await.unwrap();
    assert_eq!(session.step, VerificationStep::CodeIssued);
    let code = session.issued_code.clone().unwrap();

    // The user has not edited the motto yet.
    let err = h
        .verifier
        .confirm_motto_verification(&mut session)
        .await
        .unwrap_err();
    assert_eq!(err, FlowError::CodeNotYetPresent);

    // Out of band, the user appends the code to the motto.
    mount_alice(&h.server, &format!("gamer 4 life {}", code.as_str()), 1).await;

    let confirmed = h
        .verifier
        .confirm_motto_verification(&mut session)
        .await
        .unwrap();
    assert_eq!(session.step, VerificationStep::PasswordPending);
    match &confirmed {
        ConfirmedSession::NewIdentity { external_id, .. } => {
            assert_eq!(external_id.as_str(), "hhus-e1");
        }
        other => panic!("expected NewIdentity, got {other:?}"),
    }

    let token = h
        .verifier
        .complete_linking(confirmed, "secret1", "secret1")
        .await
        .unwrap();
    assert!(!token.as_str().is_empty());
    assert_eq!(h.store.row_count(), 1);

    // The new credential works for regular password login.
    h.verifier
        .login_with_password("ALICE", "secret1")
        .await
        .unwrap();
}

// ── Scenario B: returning user, wrong password ──────────────────────

#[tokio::test]
async fn returning_user_with_wrong_password_is_rejected() {
    let h = harness().await;

    // A linked account already exists for this identity.
    let external_id = ExternalId::new("hhus-e1").unwrap();
    h.store
        .insert(NewLinkedAccount {
            external_id: external_id.clone(),
            display_name: "Alice".to_string(),
            subject_id: SubjectId::new(),
            is_trusted_operator: false,
        })
        .await
        .unwrap();
    h.authority
        .signup(&synthetic_credential(&external_id), "right-secret")
        .await
        .unwrap();

    mount_alice(&h.server, "hello", 1).await;
    let mut session = h.verifier.begin_motto_verification("Alice").await.unwrap();
    let code = session.issued_code.clone().unwrap();

    mount_alice(&h.server, code.as_str(), 1).await;
    let confirmed = h
        .verifier
        .confirm_motto_verification(&mut session)
        .await
        .unwrap();
    assert!(matches!(confirmed, ConfirmedSession::ExistingAccount { .. }));

    let err = h
        .verifier
        .complete_linking(confirmed, "wrong-secret", "wrong-secret")
        .await
        .unwrap_err();
    assert_eq!(err, FlowError::InvalidCredentials);
    // No second account appeared.
    assert_eq!(h.store.row_count(), 1);
}

// ── Scenario C: private profile ─────────────────────────────────────

#[tokio::test]
async fn private_profile_blocks_verification_before_any_code() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("name", "bob"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h
        .verifier
        .begin_motto_verification("Bob")
        .await
        .unwrap_err();
    assert_eq!(err, FlowError::IdentityPrivate);
}

#[tokio::test]
async fn unknown_name_blocks_verification() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&h.server)
        .await;

    let err = h
        .verifier
        .begin_motto_verification("Ghost")
        .await
        .unwrap_err();
    assert_eq!(err, FlowError::IdentityNotFound);
}

// ── Scenario D: trusted-operator bypass ─────────────────────────────

#[tokio::test]
async fn operator_bypass_never_touches_the_directory() {
    let config = VerifierConfig::default()
        .with_trusted_operators([NormalizedName::new("trusted-op").unwrap()]);
    let h = harness_with(config).await;

    // Signup through the bypass: no code, proof accepted on allow-list
    // authority.
    let mut session = h
        .verifier
        .begin_motto_verification("Trusted-Op")
        .await
        .unwrap();
    assert!(session.operator_bypass);
    assert!(session.issued_code.is_none());

    let confirmed = h
        .verifier
        .confirm_motto_verification(&mut session)
        .await
        .unwrap();
    match &confirmed {
        ConfirmedSession::NewIdentity {
            external_id,
            is_trusted_operator,
            ..
        } => {
            assert!(external_id.is_operator_local());
            assert!(*is_trusted_operator);
        }
        other => panic!("expected NewIdentity, got {other:?}"),
    }
    h.verifier
        .complete_linking(confirmed, "op-secret", "op-secret")
        .await
        .unwrap();

    // Password login for the allow-listed name.
    h.verifier
        .login_with_password("trusted-op", "op-secret")
        .await
        .unwrap();

    assert_eq!(
        h.server.received_requests().await.unwrap().len(),
        0,
        "the directory must never be called for an allow-listed name"
    );
    assert_eq!(h.store.row_count(), 1);
}

#[tokio::test]
async fn bypass_applies_only_to_the_allow_list() {
    let config = VerifierConfig::default()
        .with_trusted_operators([NormalizedName::new("trusted-op").unwrap()]);
    let h = harness_with(config).await;

    // A non-listed name goes through the directory as usual.
    mount_alice(&h.server, "hello", 1).await;
    let session = h.verifier.begin_motto_verification("Alice").await.unwrap();
    assert!(!session.operator_bypass);
    assert!(session.issued_code.is_some());
    assert_eq!(h.server.received_requests().await.unwrap().len(), 1);
}

// ── Password login edges ────────────────────────────────────────────

#[tokio::test]
async fn password_login_for_unlinked_name_is_not_registered() {
    let h = harness().await;
    let err = h
        .verifier
        .login_with_password("Alice", "whatever")
        .await
        .unwrap_err();
    assert_eq!(err, FlowError::NotRegistered);
    // Resolution happens against the store, not the directory.
    assert_eq!(h.server.received_requests().await.unwrap().len(), 0);
}

// ── Code lifecycle edges ────────────────────────────────────────────

#[tokio::test]
async fn stale_code_from_a_prior_session_does_not_confirm() {
    let h = harness().await;

    mount_alice(&h.server, "hello", 2).await;
    let first = h.verifier.begin_motto_verification("Alice").await.unwrap();
    let stale_code = first.issued_code.unwrap();

    // Reissue: a second session replaces the code that counts.
    let mut second = h.verifier.begin_motto_verification("Alice").await.unwrap();
    assert_ne!(second.issued_code.as_ref(), Some(&stale_code));

    // The motto carries the stale code only.
    mount_alice(&h.server, stale_code.as_str(), 1).await;
    let err = h
        .verifier
        .confirm_motto_verification(&mut second)
        .await
        .unwrap_err();
    assert_eq!(err, FlowError::CodeNotYetPresent);
}

#[tokio::test]
async fn identity_vanishing_mid_flow_is_terminal() {
    let h = harness().await;

    mount_alice(&h.server, "hello", 1).await;
    let mut session = h.verifier.begin_motto_verification("Alice").await.unwrap();

    // Between issue and confirm the profile goes private.
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&h.server)
        .await;

    let err = h
        .verifier
        .confirm_motto_verification(&mut session)
        .await
        .unwrap_err();
    assert_eq!(err, FlowError::IdentityBecameUnresolvable);
}

#[tokio::test]
async fn name_resolving_to_a_different_identity_does_not_confirm() {
    let h = harness().await;

    mount_alice(&h.server, "hello", 1).await;
    let mut session = h.verifier.begin_motto_verification("Alice").await.unwrap();
    let code = session.issued_code.clone().unwrap();

    // The name now belongs to someone else who copied the code.
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "uniqueId": "hhus-other",
            "name": "Alice",
            "motto": code.as_str(),
            "profileVisible": true
        })))
        .mount(&h.server)
        .await;

    let err = h
        .verifier
        .confirm_motto_verification(&mut session)
        .await
        .unwrap_err();
    assert_eq!(err, FlowError::IdentityBecameUnresolvable);
}

#[tokio::test]
async fn expired_session_restarts_the_flow() {
    let h = harness().await;

    mount_alice(&h.server, "hello", 1).await;
    let mut session = h.verifier.begin_motto_verification("Alice").await.unwrap();
    session.started_at = chrono::Utc::now() - chrono::Duration::hours(1);

    let err = h
        .verifier
        .confirm_motto_verification(&mut session)
        .await
        .unwrap_err();
    assert_eq!(err, FlowError::SessionExpired);
}

// ── Secret validation ───────────────────────────────────────────────

#[tokio::test]
async fn weak_and_mismatched_secrets_are_rejected() {
    let h = harness().await;

    mount_alice(&h.server, "hello", 1).await;
    let mut session = h.verifier.begin_motto_verification("Alice").await.unwrap();
    let code = session.issued_code.clone().unwrap();
    mount_alice(&h.server, code.as_str(), 2).await;

    let confirmed = h
        .verifier
        .confirm_motto_verification(&mut session)
        .await
        .unwrap();

    let err = h
        .verifier
        .complete_linking(confirmed, "short", "short")
        .await
        .unwrap_err();
    assert_eq!(err, FlowError::WeakSecret { min: 6 });

    // The flow restarts cleanly after the failure.
    let mut session = h.verifier.begin_motto_verification("Alice").await.unwrap();
    // Old motto mock is exhausted; remount with the fresh code.
    let code = session.issued_code.clone().unwrap();
    mount_alice(&h.server, code.as_str(), 1).await;
    let confirmed = h
        .verifier
        .confirm_motto_verification(&mut session)
        .await
        .unwrap();
    let err = h
        .verifier
        .complete_linking(confirmed, "secret1", "secret2")
        .await
        .unwrap_err();
    assert_eq!(err, FlowError::SecretMismatch);
    assert_eq!(h.store.row_count(), 0);
}

// ── Create race fallback ────────────────────────────────────────────

#[tokio::test]
async fn race_loser_falls_back_to_login_when_secret_matches() {
    let h = harness().await;

    mount_alice(&h.server, "hello", 1).await;
    let mut session = h.verifier.begin_motto_verification("Alice").await.unwrap();
    let code = session.issued_code.clone().unwrap();
    mount_alice(&h.server, code.as_str(), 1).await;
    let confirmed = h
        .verifier
        .confirm_motto_verification(&mut session)
        .await
        .unwrap();

    // A concurrent attempt (the same user, double-submitting) already
    // created the account and provisioned this credential.
    let external_id = ExternalId::new("hhus-e1").unwrap();
    h.authority
        .signup(&synthetic_credential(&external_id), "secret1")
        .await
        .unwrap();
    h.store.script_failure(StoreError::DuplicateKey {
        constraint: UniqueConstraint::ExternalId,
    });

    let token = h
        .verifier
        .complete_linking(confirmed, "secret1", "secret1")
        .await
        .unwrap();
    assert!(!token.as_str().is_empty());
}

#[tokio::test]
async fn race_loser_with_foreign_secret_surfaces_already_linked() {
    let h = harness().await;

    mount_alice(&h.server, "hello", 1).await;
    let mut session = h.verifier.begin_motto_verification("Alice").await.unwrap();
    let code = session.issued_code.clone().unwrap();
    mount_alice(&h.server, code.as_str(), 1).await;
    let confirmed = h
        .verifier
        .confirm_motto_verification(&mut session)
        .await
        .unwrap();

    let external_id = ExternalId::new("hhus-e1").unwrap();
    h.authority
        .signup(&synthetic_credential(&external_id), "winner-secret")
        .await
        .unwrap();
    h.store.script_failure(StoreError::DuplicateKey {
        constraint: UniqueConstraint::ExternalId,
    });

    let err = h
        .verifier
        .complete_linking(confirmed, "secret1", "secret1")
        .await
        .unwrap_err();
    assert_eq!(err, FlowError::AlreadyLinked);
}

// ── Directory outage ────────────────────────────────────────────────

#[tokio::test]
async fn directory_outage_surfaces_as_unavailable() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.server)
        .await;

    let err = h
        .verifier
        .begin_motto_verification("Alice")
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::DirectoryUnavailable { .. }));
}

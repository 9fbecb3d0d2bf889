//! Tests for the session gate state machine.

use std::sync::atomic::AtomicUsize;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rstest::rstest;
use tokio::sync::{Mutex as AsyncMutex, oneshot};

use super::*;
use crate::domain::ports::{MockSessionStore, RegistrationError, SessionStorageError};
use crate::domain::{EmailAddress, NewUser, PasswordDigest, UserId};

fn alice() -> UserRecord {
    UserRecord::new(
        UserId::random(),
        EmailAddress::parse("a@x.com").expect("valid email"),
        PasswordDigest::derive_with_salt("secret", &[7; 16], 1),
        None,
        Utc::now(),
    )
}

fn gate_over(store: MockSessionStore) -> SessionGate {
    SessionGate::new(Arc::new(store))
}

async fn mounted_signed_out_gate(store: MockSessionStore) -> SessionGate {
    let gate = gate_over(store);
    gate.mount().await;
    gate
}

fn signed_out_store() -> MockSessionStore {
    let mut store = MockSessionStore::new();
    store
        .expect_current_user()
        .times(1)
        .return_once(|| SessionLookup::NoSession);
    store
}

#[tokio::test]
async fn new_gate_starts_checking_on_login_route() {
    let gate = gate_over(MockSessionStore::new());
    assert_eq!(gate.state(), GateState::Checking);
    assert_eq!(gate.route(), Route::Login);
}

#[tokio::test]
async fn mount_without_session_becomes_unauthenticated() {
    let gate = gate_over(signed_out_store());

    let state = gate.mount().await;

    assert_eq!(state, GateState::Unauthenticated { notice: None });
    assert_eq!(gate.route(), Route::Login);
}

#[tokio::test]
async fn mount_with_session_redirects_to_profile() {
    let user = alice();
    let found = user.clone();
    let mut store = MockSessionStore::new();
    store
        .expect_current_user()
        .times(1)
        .return_once(move || SessionLookup::Found(found));
    let gate = gate_over(store);

    let state = gate.mount().await;

    assert_eq!(state, GateState::Authenticated(user));
    assert_eq!(gate.route(), Route::Profile);
}

#[tokio::test]
async fn mount_fault_is_treated_as_signed_out() {
    let mut store = MockSessionStore::new();
    store
        .expect_current_user()
        .times(1)
        .return_once(|| SessionLookup::Fault(SessionStorageError::corrupt("truncated file")));
    let gate = gate_over(store);

    assert_eq!(
        gate.mount().await,
        GateState::Unauthenticated { notice: None }
    );
}

#[tokio::test]
async fn mount_checks_the_store_only_once() {
    let gate = gate_over(signed_out_store());

    gate.mount().await;
    let second = gate.mount().await;

    assert_eq!(second, GateState::Unauthenticated { notice: None });
}

#[rstest]
#[case("", "secret")]
#[case("   ", "secret")]
#[case("a@x.com", "")]
#[case("a@x.com", " \n ")]
#[tokio::test]
async fn blank_fields_never_reach_the_store(#[case] email: &str, #[case] password: &str) {
    let mut store = signed_out_store();
    store.expect_login_user().never();
    let gate = mounted_signed_out_gate(store).await;

    let outcome = gate.submit(email, password).await;

    assert_eq!(outcome, SubmitOutcome::Rejected(GateNotice::MissingFields));
    assert_eq!(
        gate.state(),
        GateState::Unauthenticated {
            notice: Some(GateNotice::MissingFields)
        }
    );
}

#[tokio::test]
async fn successful_submit_authenticates() {
    let user = alice();
    let matched = user.clone();
    let mut store = signed_out_store();
    store
        .expect_login_user()
        .withf(|credentials| credentials.email() == "A@X.com" && credentials.password() == "secret")
        .times(1)
        .return_once(move |_| Ok(Some(matched)));
    let gate = mounted_signed_out_gate(store).await;

    let outcome = gate.submit("  A@X.com ", "secret").await;

    assert_eq!(outcome, SubmitOutcome::Authenticated(user.clone()));
    assert_eq!(gate.state(), GateState::Authenticated(user));
    assert_eq!(gate.route(), Route::Profile);
}

#[rstest]
#[case(Ok(None))]
#[case(Err(SessionStorageError::io("read failed")))]
#[tokio::test]
async fn mismatch_and_fault_present_the_same_notice(
    #[case] result: Result<Option<UserRecord>, SessionStorageError>,
) {
    let mut store = signed_out_store();
    store
        .expect_login_user()
        .times(1)
        .return_once(move |_| result);
    let gate = mounted_signed_out_gate(store).await;

    let outcome = gate.submit("a@x.com", "wrong").await;

    assert_eq!(outcome, SubmitOutcome::Rejected(GateNotice::LoginFailed));
    assert_eq!(
        gate.state(),
        GateState::Unauthenticated {
            notice: Some(GateNotice::LoginFailed)
        }
    );
}

#[tokio::test]
async fn failed_submit_allows_retry() {
    let user = alice();
    let matched = user.clone();
    let mut store = signed_out_store();
    let mut attempts = 0;
    store.expect_login_user().times(2).returning(move |_| {
        attempts += 1;
        if attempts == 1 {
            Ok(None)
        } else {
            Ok(Some(matched.clone()))
        }
    });
    let gate = mounted_signed_out_gate(store).await;

    assert_eq!(
        gate.submit("a@x.com", "wrong").await,
        SubmitOutcome::Rejected(GateNotice::LoginFailed)
    );
    assert_eq!(
        gate.submit("a@x.com", "secret").await,
        SubmitOutcome::Authenticated(user)
    );
}

#[tokio::test]
async fn submit_before_mount_is_ignored() {
    let mut store = MockSessionStore::new();
    store.expect_login_user().never();
    let gate = gate_over(store);

    assert_eq!(gate.submit("a@x.com", "secret").await, SubmitOutcome::Ignored);
}

#[tokio::test]
async fn submit_after_authentication_is_ignored() {
    let user = alice();
    let mut store = MockSessionStore::new();
    store
        .expect_current_user()
        .times(1)
        .return_once(move || SessionLookup::Found(user));
    store.expect_login_user().never();
    let gate = gate_over(store);
    gate.mount().await;

    assert_eq!(gate.submit("a@x.com", "secret").await, SubmitOutcome::Ignored);
}

#[test]
fn notices_never_mention_the_failing_part() {
    let message = GateNotice::LoginFailed.message();
    assert_eq!(message, "Invalid email or password. Please try again.");
    assert_eq!(GateNotice::MissingFields.message(), "Please fill in all fields");
}

/// Store whose `login_user` suspends until released, counting calls.
struct HeldLoginStore {
    release: AsyncMutex<Option<oneshot::Receiver<()>>>,
    login_calls: AtomicUsize,
    user: UserRecord,
}

#[async_trait]
impl SessionStore for HeldLoginStore {
    async fn current_user(&self) -> SessionLookup {
        SessionLookup::NoSession
    }

    async fn login_user(
        &self,
        _credentials: &LoginCredentials,
    ) -> Result<Option<UserRecord>, SessionStorageError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let receiver = self.release.lock().await.take();
        if let Some(receiver) = receiver {
            let _released = receiver.await;
        }
        Ok(Some(self.user.clone()))
    }

    async fn logout(&self) -> Result<(), SessionStorageError> {
        Ok(())
    }

    async fn register_user(&self, _new_user: NewUser) -> Result<UserRecord, RegistrationError> {
        Err(RegistrationError::EmailTaken)
    }
}

#[tokio::test]
async fn second_submit_while_outstanding_is_ignored() {
    let (release_tx, release_rx) = oneshot::channel();
    let user = alice();
    let store = Arc::new(HeldLoginStore {
        release: AsyncMutex::new(Some(release_rx)),
        login_calls: AtomicUsize::new(0),
        user: user.clone(),
    });
    let gate = SessionGate::new(Arc::clone(&store) as Arc<dyn SessionStore>);
    gate.mount().await;

    let (first, second) = tokio::join!(gate.submit("a@x.com", "secret"), async {
        let outcome = gate.submit("a@x.com", "secret").await;
        assert_eq!(gate.state(), GateState::Submitting);
        assert!(!gate.state().accepts_submit());
        release_tx.send(()).expect("release held login");
        outcome
    });

    assert_eq!(first, SubmitOutcome::Authenticated(user));
    assert_eq!(second, SubmitOutcome::Ignored);
    assert_eq!(store.login_calls.load(Ordering::SeqCst), 1);
}

/// Store whose first session lookup never completes.
struct StalledLookupStore {
    lookups: AtomicUsize,
}

#[async_trait]
impl SessionStore for StalledLookupStore {
    async fn current_user(&self) -> SessionLookup {
        if self.lookups.fetch_add(1, Ordering::SeqCst) == 0 {
            std::future::pending::<()>().await;
        }
        SessionLookup::NoSession
    }

    async fn login_user(
        &self,
        _credentials: &LoginCredentials,
    ) -> Result<Option<UserRecord>, SessionStorageError> {
        Ok(None)
    }

    async fn logout(&self) -> Result<(), SessionStorageError> {
        Ok(())
    }

    async fn register_user(&self, _new_user: NewUser) -> Result<UserRecord, RegistrationError> {
        Err(RegistrationError::EmailTaken)
    }
}

#[tokio::test]
async fn abandoned_mount_can_be_retried() {
    let store = Arc::new(StalledLookupStore {
        lookups: AtomicUsize::new(0),
    });
    let gate = SessionGate::new(Arc::clone(&store) as Arc<dyn SessionStore>);

    let abandoned = tokio::time::timeout(Duration::from_millis(10), gate.mount()).await;
    assert!(abandoned.is_err());
    assert_eq!(gate.state(), GateState::Checking);

    assert_eq!(
        gate.mount().await,
        GateState::Unauthenticated { notice: None }
    );
    assert_eq!(store.lookups.load(Ordering::SeqCst), 2);
    assert_eq!(
        gate.submit("a@x.com", "wrong").await,
        SubmitOutcome::Rejected(GateNotice::LoginFailed)
    );
}

#[rstest]
#[case(Route::Login, "Login", false)]
#[case(Route::Signup, "Signup", false)]
#[case(Route::Profile, "Profile", true)]
#[case(Route::EditProfile, "EditProfile", true)]
fn routes_use_navigator_names(
    #[case] route: Route,
    #[case] name: &str,
    #[case] requires_session: bool,
) {
    assert_eq!(route.name(), name);
    assert_eq!(route.requires_session(), requires_session);
}

//! Screen-level session gate.
//!
//! The sign-in screen owns one [`SessionGate`]. On mount the gate asks the
//! store who is signed in and either redirects to the profile area or waits
//! for credentials. Submissions are validated locally, forwarded to the store
//! at most one at a time, and every failure collapses into a single generic
//! notice so the screen never reveals whether the email, the password or the
//! storage medium was at fault.
//!
//! ## State machine
//!
//! ```text
//! Checking ──found──────────────────────────────▶ Authenticated
//!    │
//!    └─no session / fault─▶ Unauthenticated ──submit──▶ Submitting
//!                                ▲                         │
//!                                └──no match / fault───────┤
//!                                                          └─match─▶ Authenticated
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::domain::ports::{SessionLookup, SessionStore};
use crate::domain::{LoginCredentials, UserRecord};

/// Screens the navigator can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Sign-in screen.
    Login,
    /// Account creation screen.
    Signup,
    /// Authenticated profile area.
    Profile,
    /// Profile editor, reached from the profile area.
    EditProfile,
}

impl Route {
    /// Screen name registered with the navigator.
    pub fn name(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Signup => "Signup",
            Self::Profile => "Profile",
            Self::EditProfile => "EditProfile",
        }
    }

    /// Whether the screen may only be shown with an active session.
    pub fn requires_session(self) -> bool {
        matches!(self, Self::Profile | Self::EditProfile)
    }
}

/// User-facing message attached to the sign-in form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateNotice {
    /// A field was blank; the store was not contacted.
    MissingFields,
    /// The store rejected the credentials or could not be read.
    LoginFailed,
}

impl GateNotice {
    /// Text shown to the user.
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingFields => "Please fill in all fields",
            Self::LoginFailed => "Invalid email or password. Please try again.",
        }
    }
}

/// Where the gate currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Mount-time lookup pending.
    Checking,
    /// Waiting for credentials, optionally showing a notice.
    Unauthenticated {
        /// Notice from the last rejected submission.
        notice: Option<GateNotice>,
    },
    /// A login call is outstanding; further submits are ignored.
    Submitting,
    /// Hand-off to the authenticated area.
    Authenticated(UserRecord),
}

impl GateState {
    /// Screen the navigator should display for this state.
    pub fn route(&self) -> Route {
        match self {
            Self::Authenticated(_) => Route::Profile,
            Self::Checking | Self::Unauthenticated { .. } | Self::Submitting => Route::Login,
        }
    }

    /// Whether the submit control should accept input.
    pub fn accepts_submit(&self) -> bool {
        matches!(self, Self::Unauthenticated { .. })
    }
}

/// Result of one submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Credentials matched; navigate to the profile area.
    Authenticated(UserRecord),
    /// Submission was refused; show the notice.
    Rejected(GateNotice),
    /// The gate was not accepting submissions (checking, already submitting,
    /// or already authenticated).
    Ignored,
}

/// Session gate bound to one screen instance.
pub struct SessionGate {
    store: Arc<dyn SessionStore>,
    state: Mutex<GateState>,
    mounted: AtomicBool,
}

impl SessionGate {
    /// Create a gate in the [`GateState::Checking`] state.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            state: Mutex::new(GateState::Checking),
            mounted: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> GateState {
        self.lock_state().clone()
    }

    /// Screen the navigator should display.
    pub fn route(&self) -> Route {
        self.lock_state().route()
    }

    /// Run the mount-time session check.
    ///
    /// Only the first completed call contacts the store; later calls return
    /// the current state unchanged. Dropping the future before the lookup
    /// finishes leaves the gate in `Checking` and lets the next call retry.
    /// A storage fault is treated as "not signed in" so the user can still
    /// attempt to log in.
    pub async fn mount(&self) -> GateState {
        if self.mounted.swap(true, Ordering::AcqRel) {
            return self.state();
        }
        let mut attempt = MountAttempt {
            mounted: &self.mounted,
            finished: false,
        };

        let next = match self.store.current_user().await {
            SessionLookup::Found(user) => {
                debug!(user_id = %user.id(), "existing session, redirecting");
                GateState::Authenticated(user)
            }
            SessionLookup::NoSession => GateState::Unauthenticated { notice: None },
            SessionLookup::Fault(fault) => {
                warn!(error = %fault, "session check failed; treating as signed out");
                GateState::Unauthenticated { notice: None }
            }
        };
        *self.lock_state() = next.clone();
        attempt.finished = true;
        next
    }

    /// Submit the sign-in form.
    pub async fn submit(&self, email: &str, password: &str) -> SubmitOutcome {
        let credentials = {
            let mut state = self.lock_state();
            if !state.accepts_submit() {
                debug!(state = ?*state, "submit ignored");
                return SubmitOutcome::Ignored;
            }
            match LoginCredentials::try_from_parts(email, password) {
                Ok(credentials) => {
                    *state = GateState::Submitting;
                    credentials
                }
                Err(reason) => {
                    debug!(%reason, "submit rejected locally");
                    *state = GateState::Unauthenticated {
                        notice: Some(GateNotice::MissingFields),
                    };
                    return SubmitOutcome::Rejected(GateNotice::MissingFields);
                }
            }
        };

        let (next, outcome) = match self.store.login_user(&credentials).await {
            Ok(Some(user)) => (
                GateState::Authenticated(user.clone()),
                SubmitOutcome::Authenticated(user),
            ),
            Ok(None) => Self::login_failed(),
            Err(fault) => {
                warn!(error = %fault, "login failed on storage fault");
                Self::login_failed()
            }
        };
        *self.lock_state() = next;
        outcome
    }

    fn login_failed() -> (GateState, SubmitOutcome) {
        (
            GateState::Unauthenticated {
                notice: Some(GateNotice::LoginFailed),
            },
            SubmitOutcome::Rejected(GateNotice::LoginFailed),
        )
    }

    fn lock_state(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the mount flag unless the lookup it guards ran to completion.
struct MountAttempt<'a> {
    mounted: &'a AtomicBool,
    finished: bool,
}

impl Drop for MountAttempt<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.mounted.store(false, Ordering::Release);
        }
    }
}

#[cfg(test)]
#[path = "session_gate_tests.rs"]
mod tests;

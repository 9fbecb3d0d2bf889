//! Driving port for session lookups and sign-in.
//!
//! Screens hold an injected `Arc<dyn SessionStore>` rather than reaching for
//! a process-wide storage singleton, so tests can substitute a fake.

use async_trait::async_trait;

use crate::domain::{LoginCredentials, NewUser, UserRecord};

use super::SessionStorageError;

/// Result of asking who is currently signed in.
///
/// "Nobody" is an expected outcome and is kept apart from a storage fault so
/// callers choose how to treat each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    /// The session pointer references this account.
    Found(UserRecord),
    /// Nobody is signed in.
    NoSession,
    /// The persistence medium failed or is corrupt.
    Fault(SessionStorageError),
}

impl From<Result<Option<UserRecord>, SessionStorageError>> for SessionLookup {
    fn from(value: Result<Option<UserRecord>, SessionStorageError>) -> Self {
        match value {
            Ok(Some(user)) => Self::Found(user),
            Ok(None) => Self::NoSession,
            Err(fault) => Self::Fault(fault),
        }
    }
}

/// Errors returned when registering a new account.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// Another account already uses this email (compared case-insensitively).
    #[error("an account with this email already exists")]
    EmailTaken,
    /// The persistence medium failed.
    #[error(transparent)]
    Storage(#[from] SessionStorageError),
}

/// Session store use-cases consumed by screens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Account referenced by the session pointer. Read-only.
    async fn current_user(&self) -> SessionLookup;

    /// Check credentials and, on success, point the session at the account.
    ///
    /// `Ok(None)` means no account matched. Unknown email and wrong password
    /// are deliberately indistinguishable, and the session pointer is left
    /// untouched.
    async fn login_user(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<UserRecord>, SessionStorageError>;

    /// Clear the session pointer. Clearing an empty pointer succeeds.
    async fn logout(&self) -> Result<(), SessionStorageError>;

    /// Store a new account. Does not sign it in.
    async fn register_user(&self, new_user: NewUser) -> Result<UserRecord, RegistrationError>;
}

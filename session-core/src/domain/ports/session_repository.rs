//! Driven port for the persistence medium behind the session store.
//!
//! Adapters persist one [`SessionSnapshot`]: every registered account keyed by
//! id, plus the single current-session slot. The store service serialises
//! read-modify-write cycles; adapters only need whole-snapshot reads and
//! replacements that readers never observe half-applied.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{UserId, UserRecord};

use super::define_port_error;

define_port_error! {
    /// Faults raised by the persistence medium.
    pub enum SessionStorageError {
        /// The medium could not be reached or opened.
        Unavailable => "session storage unavailable: {message}",
        /// Reading or writing the medium failed.
        Io => "session storage i/o failed: {message}",
        /// The medium was readable but its contents are not a valid snapshot.
        Corrupt => "session storage corrupt: {message}",
    }
}

/// Logical contents of the persistence medium.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Registered accounts keyed by id.
    pub users: BTreeMap<UserId, UserRecord>,
    /// Account currently signed in, if any.
    pub current_user_id: Option<UserId>,
}

impl SessionSnapshot {
    /// Find the record whose normalised email matches raw login input.
    pub fn find_by_email(&self, raw_email: &str) -> Option<&UserRecord> {
        self.users
            .values()
            .find(|record| record.email().matches(raw_email))
    }

    /// Resolve the session pointer.
    ///
    /// Returns `Ok(None)` when nobody is signed in and an error when the
    /// pointer references an account that does not exist.
    pub fn current_user(&self) -> Result<Option<&UserRecord>, SessionStorageError> {
        let Some(id) = self.current_user_id else {
            return Ok(None);
        };
        self.users.get(&id).map(Some).ok_or_else(|| {
            SessionStorageError::corrupt(format!("session references unknown user {id}"))
        })
    }
}

/// Port for loading and replacing the session snapshot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Load the current snapshot. An uninitialised medium yields an empty one.
    async fn load(&self) -> Result<SessionSnapshot, SessionStorageError>;

    /// Replace the stored snapshot atomically.
    async fn replace(&self, snapshot: &SessionSnapshot) -> Result<(), SessionStorageError>;
}

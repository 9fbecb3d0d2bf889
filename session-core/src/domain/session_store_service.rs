//! Session store service.
//!
//! Implements the [`SessionStore`] driving port on top of any
//! [`SessionRepository`]. Mutations run under one async lock so a login,
//! logout or registration never interleaves with another; lookups read a
//! whole snapshot and therefore never see a half-applied pointer change.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    RegistrationError, SessionLookup, SessionRepository, SessionStorageError, SessionStore,
};
use crate::domain::{LoginCredentials, NewUser, PasswordDigest, UserId, UserRecord};

static DECOY_DIGEST: OnceLock<PasswordDigest> = OnceLock::new();

/// Digest verified when no account matches, so unknown emails cost the same
/// as wrong passwords.
fn decoy_digest() -> &'static PasswordDigest {
    DECOY_DIGEST.get_or_init(|| PasswordDigest::derive("decoy-credential"))
}

/// Check `candidate` against `digest` on the blocking pool, or against the
/// decoy digest when no account matched.
async fn verify_password(
    digest: Option<PasswordDigest>,
    candidate: &str,
) -> Result<bool, SessionStorageError> {
    let candidate = Zeroizing::new(candidate.to_owned());
    tokio::task::spawn_blocking(move || match digest {
        Some(digest) => digest.verify(&candidate),
        None => {
            decoy_digest().verify(&candidate);
            false
        }
    })
    .await
    .map_err(|error| SessionStorageError::unavailable(format!("password check failed: {error}")))
}

async fn derive_password(password: &str) -> Result<PasswordDigest, SessionStorageError> {
    let password = Zeroizing::new(password.to_owned());
    tokio::task::spawn_blocking(move || PasswordDigest::derive(&password))
        .await
        .map_err(|error| {
            SessionStorageError::unavailable(format!("password digest failed: {error}"))
        })
}

/// Session store backed by a persistence medium.
pub struct SessionStoreService<R: ?Sized> {
    repository: Arc<R>,
    write_lock: Mutex<()>,
}

impl<R: ?Sized> SessionStoreService<R> {
    /// Create a store over the given repository.
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl<R> SessionStore for SessionStoreService<R>
where
    R: SessionRepository + ?Sized + 'static,
{
    async fn current_user(&self) -> SessionLookup {
        let lookup = match self.repository.load().await {
            Ok(snapshot) => snapshot.current_user().map(|user| user.cloned()),
            Err(fault) => Err(fault),
        };
        match &lookup {
            Ok(Some(user)) => debug!(user_id = %user.id(), "session resolved"),
            Ok(None) => debug!("no active session"),
            Err(fault) => warn!(error = %fault, "session lookup failed"),
        }
        SessionLookup::from(lookup)
    }

    async fn login_user(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<UserRecord>, SessionStorageError> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.repository.load().await?;

        let user = snapshot.find_by_email(&credentials.lookup_key()).cloned();
        let digest = user.as_ref().map(|user| user.credential().clone());
        let matched = verify_password(digest, credentials.password()).await?;
        let Some(user) = user.filter(|_| matched) else {
            debug!("login rejected");
            return Ok(None);
        };

        if snapshot.current_user_id != Some(user.id()) {
            snapshot.current_user_id = Some(user.id());
            self.repository.replace(&snapshot).await?;
        }
        info!(user_id = %user.id(), "session started");
        Ok(Some(user))
    }

    async fn logout(&self) -> Result<(), SessionStorageError> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.repository.load().await?;
        if let Some(user_id) = snapshot.current_user_id.take() {
            self.repository.replace(&snapshot).await?;
            info!(%user_id, "session ended");
        }
        Ok(())
    }

    async fn register_user(&self, new_user: NewUser) -> Result<UserRecord, RegistrationError> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.repository.load().await?;
        if snapshot
            .users
            .values()
            .any(|existing| existing.email() == new_user.email())
        {
            debug!("registration rejected: email taken");
            return Err(RegistrationError::EmailTaken);
        }

        let credential = derive_password(new_user.password()).await?;
        let record = UserRecord::new(
            UserId::random(),
            new_user.email().clone(),
            credential,
            new_user.display_name().cloned(),
            Utc::now(),
        );
        snapshot.users.insert(record.id(), record.clone());
        self.repository.replace(&snapshot).await?;
        info!(user_id = %record.id(), "account registered");
        Ok(record)
    }
}

#[cfg(test)]
#[path = "session_store_service_tests.rs"]
mod tests;

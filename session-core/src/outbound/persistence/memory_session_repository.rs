//! In-memory `SessionRepository` adapter.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{SessionRepository, SessionSnapshot, SessionStorageError};

/// Session repository holding its snapshot in process memory.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    snapshot: Mutex<SessionSnapshot>,
}

impl InMemorySessionRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository seeded with `snapshot`.
    pub fn with_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn load(&self) -> Result<SessionSnapshot, SessionStorageError> {
        self.snapshot
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| SessionStorageError::unavailable("in-memory snapshot lock poisoned"))
    }

    async fn replace(&self, snapshot: &SessionSnapshot) -> Result<(), SessionStorageError> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| SessionStorageError::unavailable("in-memory snapshot lock poisoned"))?;
        *guard = snapshot.clone();
        Ok(())
    }
}

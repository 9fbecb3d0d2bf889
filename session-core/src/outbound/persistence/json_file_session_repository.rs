//! JSON file `SessionRepository` adapter.
//!
//! The whole snapshot lives in one document. Writes go to a staging file in
//! the same directory and are renamed over the target, so a concurrent reader
//! (in this or another process) sees either the old or the new document.
//! A missing file or directory is an empty store; a document that does not
//! parse is reported as corrupt rather than silently reset.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{SessionRepository, SessionSnapshot, SessionStorageError};
use crate::domain::{UserId, UserRecord};

const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SessionDocument {
    version: u32,
    users: Vec<UserRecord>,
    #[serde(default)]
    current_user_id: Option<UserId>,
}

impl SessionDocument {
    fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            users: snapshot.users.values().cloned().collect(),
            current_user_id: snapshot.current_user_id,
        }
    }

    fn into_snapshot(self) -> Result<SessionSnapshot, SessionStorageError> {
        if self.version != DOCUMENT_VERSION {
            return Err(SessionStorageError::corrupt(format!(
                "unsupported document version {}",
                self.version
            )));
        }
        let mut users = BTreeMap::new();
        for user in self.users {
            let id = user.id();
            if users.insert(id, user).is_some() {
                return Err(SessionStorageError::corrupt(format!(
                    "duplicate user id {id}"
                )));
            }
        }
        Ok(SessionSnapshot {
            users,
            current_user_id: self.current_user_id,
        })
    }
}

/// Session repository persisted as a JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileSessionRepository {
    path: PathBuf,
}

impl JsonFileSessionRepository {
    /// Create a repository for the document at `path`. Nothing is touched on
    /// disk until the first load or replace.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionRepository for JsonFileSessionRepository {
    async fn load(&self) -> Result<SessionSnapshot, SessionStorageError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_snapshot(&path))
            .await
            .map_err(|error| SessionStorageError::unavailable(format!("load task failed: {error}")))?
    }

    async fn replace(&self, snapshot: &SessionSnapshot) -> Result<(), SessionStorageError> {
        let path = self.path.clone();
        let bytes = serde_json::to_vec_pretty(&SessionDocument::from_snapshot(snapshot))
            .map_err(|error| SessionStorageError::io(format!("encode snapshot: {error}")))?;
        tokio::task::spawn_blocking(move || write_document(&path, &bytes))
            .await
            .map_err(|error| {
                SessionStorageError::unavailable(format!("replace task failed: {error}"))
            })?
    }
}

fn split_path(path: &Path) -> Result<(PathBuf, OsString), SessionStorageError> {
    let file_name = path.file_name().ok_or_else(|| {
        SessionStorageError::unavailable(format!(
            "session store path '{}' has no file name",
            path.display()
        ))
    })?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok((parent.to_path_buf(), file_name.to_os_string()))
}

fn read_snapshot(path: &Path) -> Result<SessionSnapshot, SessionStorageError> {
    let (dir_path, file_name) = split_path(path)?;
    let directory = match Dir::open_ambient_dir(&dir_path, ambient_authority()) {
        Ok(directory) => directory,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "session store directory missing; empty store");
            return Ok(SessionSnapshot::default());
        }
        Err(error) => {
            return Err(SessionStorageError::unavailable(format!(
                "open '{}': {error}",
                dir_path.display()
            )));
        }
    };

    let contents = match directory.read_to_string(&file_name) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "session store file missing; empty store");
            return Ok(SessionSnapshot::default());
        }
        Err(error) => {
            return Err(SessionStorageError::io(format!(
                "read '{}': {error}",
                path.display()
            )));
        }
    };

    let document: SessionDocument = serde_json::from_str(&contents).map_err(|error| {
        SessionStorageError::corrupt(format!("parse '{}': {error}", path.display()))
    })?;
    document.into_snapshot()
}

fn write_document(path: &Path, bytes: &[u8]) -> Result<(), SessionStorageError> {
    let (dir_path, file_name) = split_path(path)?;
    Dir::create_ambient_dir_all(&dir_path, ambient_authority()).map_err(|error| {
        SessionStorageError::unavailable(format!("create '{}': {error}", dir_path.display()))
    })?;
    let directory = Dir::open_ambient_dir(&dir_path, ambient_authority()).map_err(|error| {
        SessionStorageError::unavailable(format!("open '{}': {error}", dir_path.display()))
    })?;

    let staging = format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        Uuid::new_v4().simple()
    );
    let result = directory
        .write(&staging, bytes)
        .and_then(|()| directory.rename(&staging, &directory, &file_name))
        .map_err(|error| SessionStorageError::io(format!("write '{}': {error}", path.display())));
    if result.is_err() {
        let _cleanup_result = directory.remove_file(&staging);
    }
    result
}

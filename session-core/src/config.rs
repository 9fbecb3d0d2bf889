//! Session store configuration loaded via OrthoConfig.
//!
//! Screens receive their store through [`build_session_store`] instead of
//! importing a global, so the same wiring serves the CLI, the app shell and
//! tests.

use std::path::PathBuf;
use std::sync::Arc;

use clap::ValueEnum;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::SessionStoreService;
use crate::domain::ports::SessionStore;
use crate::outbound::persistence::{InMemorySessionRepository, JsonFileSessionRepository};

const DEFAULT_STORE_FILE: &str = "session-store.json";

/// Persistence medium backing the session store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSON document on disk; sessions survive restarts.
    #[default]
    File,
    /// Process memory only; nothing survives the process.
    Memory,
}

/// Configuration selecting and locating the session persistence medium.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SESSION_STORE")]
pub struct SessionStoreSettings {
    /// Persistence medium; defaults to [`StoreBackend::File`].
    pub backend: Option<StoreBackend>,
    /// Optional override for the JSON document location.
    pub path: Option<PathBuf>,
}

impl SessionStoreSettings {
    /// Return the configured backend, falling back to the file store.
    pub fn backend(&self) -> StoreBackend {
        self.backend.unwrap_or_default()
    }

    /// Return the configured document path, falling back to the default.
    pub fn path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE))
    }

    /// Apply command-line overrides on top of loaded settings. `None` keeps
    /// the loaded value.
    #[must_use]
    pub fn with_overrides(mut self, backend: Option<StoreBackend>, path: Option<PathBuf>) -> Self {
        if backend.is_some() {
            self.backend = backend;
        }
        if path.is_some() {
            self.path = path;
        }
        self
    }
}

/// Wire the configured adapter into a session store.
pub fn build_session_store(settings: &SessionStoreSettings) -> Arc<dyn SessionStore> {
    match settings.backend() {
        StoreBackend::Memory => {
            info!(backend = "memory", "session store configured");
            Arc::new(SessionStoreService::new(Arc::new(
                InMemorySessionRepository::new(),
            )))
        }
        StoreBackend::File => {
            let path = settings.path();
            info!(backend = "file", path = %path.display(), "session store configured");
            Arc::new(SessionStoreService::new(Arc::new(
                JsonFileSessionRepository::new(path),
            )))
        }
    }
}

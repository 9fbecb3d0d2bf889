//! Session persistence and login gating for the mobile app shell.
//!
//! The crate is split along the same hexagonal seams as the rest of the
//! workspace: `domain` holds the credential model, ports, the session store
//! service and the screen-level session gate; `outbound` holds persistence
//! adapters; `config` wires an adapter into an injectable store.

pub mod config;
pub mod domain;
pub mod outbound;

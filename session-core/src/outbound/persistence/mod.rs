//! Persistence adapters for the session repository port.
//!
//! - [`InMemorySessionRepository`] keeps the snapshot in process memory; it
//!   backs tests and ephemeral runs.
//! - [`JsonFileSessionRepository`] keeps one JSON document on disk and
//!   replaces it atomically on every write.

mod json_file_session_repository;
mod memory_session_repository;

pub use json_file_session_repository::JsonFileSessionRepository;
pub use memory_session_repository::InMemorySessionRepository;

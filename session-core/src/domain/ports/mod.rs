//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod session_repository;
mod session_store;

#[cfg(test)]
pub use session_repository::MockSessionRepository;
pub use session_repository::{SessionRepository, SessionSnapshot, SessionStorageError};
#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::{RegistrationError, SessionLookup, SessionStore};

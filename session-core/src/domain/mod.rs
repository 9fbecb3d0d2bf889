//! Domain primitives, ports and services.
//!
//! Purpose: define the account and credential types, the session store
//! driving port and its service, and the screen-level session gate. Nothing
//! here knows about files, widgets or navigation libraries.
//!
//! Public surface:
//! - `UserRecord`, `UserId`, `EmailAddress`, `DisplayName` — account model.
//! - `LoginCredentials`, `NewUser` — validated form input.
//! - `PasswordDigest` — salted credential storage.
//! - `SessionStoreService` — `SessionStore` over any `SessionRepository`.
//! - `SessionGate` — sign-in screen state machine.

pub mod auth;
pub mod password;
pub mod ports;
pub mod session_gate;
pub mod session_store_service;
pub mod signup;
pub mod user;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::password::{PasswordDigest, PasswordDigestError};
pub use self::session_gate::{GateNotice, GateState, Route, SessionGate, SubmitOutcome};
pub use self::session_store_service::SessionStoreService;
pub use self::signup::NewUser;
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, EmailAddress, UserId, UserRecord, UserValidationError,
    email_lookup_key,
};

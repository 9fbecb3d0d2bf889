//! Login credentials submitted from the sign-in screen.
//!
//! Blank-field rejection happens here so a gate can refuse a submission
//! before it ever talks to the session store.

use std::fmt;

use zeroize::Zeroizing;

use super::user::email_lookup_key;

/// Domain error returned when login input is incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was missing or blank once trimmed.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed and non-empty.
/// - `password` is non-blank but keeps caller-provided whitespace, so the
///   credential comparison sees exactly what the user typed.
///
/// # Examples
/// ```
/// use session_core::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("  A@X.com ", "secret").unwrap();
/// assert_eq!(creds.email(), "A@X.com");
/// assert_eq!(creds.lookup_key(), "a@x.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }

        if password.trim().is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: trimmed.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Trimmed email as entered.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Normalised email used to find the matching record.
    pub fn lookup_key(&self) -> String {
        email_lookup_key(&self.email)
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

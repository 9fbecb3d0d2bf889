//! Registration input for new accounts.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{DisplayName, EmailAddress, UserValidationError};

/// Validated sign-up payload.
///
/// ## Invariants
/// - `email` is normalised (see [`EmailAddress`]).
/// - `password` is non-blank; it is digested before storage and never
///   persisted as entered.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    email: EmailAddress,
    password: Zeroizing<String>,
    display_name: Option<DisplayName>,
}

impl NewUser {
    /// Validate raw sign-up form values.
    ///
    /// # Examples
    /// ```
    /// use session_core::domain::NewUser;
    ///
    /// let new_user = NewUser::try_from_parts(" Ada@Example.com ", "secret", Some("Ada")).unwrap();
    /// assert_eq!(new_user.email().as_ref(), "ada@example.com");
    /// ```
    pub fn try_from_parts(
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Self, UserValidationError> {
        let email = EmailAddress::parse(email)?;
        if password.trim().is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        let display_name = display_name.map(DisplayName::new).transpose()?;
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
            display_name,
        })
    }

    /// Normalised email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password as entered.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Optional display name.
    pub fn display_name(&self) -> Option<&DisplayName> {
        self.display_name.as_ref()
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", None, UserValidationError::EmptyEmail)]
    #[case("nobody", "pw", None, UserValidationError::InvalidEmail)]
    #[case("a@x.com", "  ", None, UserValidationError::EmptyPassword)]
    #[case("a@x.com", "pw", Some(" "), UserValidationError::EmptyDisplayName)]
    fn invalid_sign_up_input(
        #[case] email: &str,
        #[case] password: &str,
        #[case] display_name: Option<&str>,
        #[case] expected: UserValidationError,
    ) {
        let err = NewUser::try_from_parts(email, password, display_name)
            .expect_err("invalid input must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn valid_sign_up_input_is_normalised() {
        let new_user = NewUser::try_from_parts(" A@X.com", "secret", Some(" Ada "))
            .expect("valid input");
        assert_eq!(new_user.email().as_ref(), "a@x.com");
        assert_eq!(new_user.password(), "secret");
        let display_name = new_user.display_name().map(|name| name.as_ref());
        assert_eq!(display_name, Some("Ada"));
    }
}

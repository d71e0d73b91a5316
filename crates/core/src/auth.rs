use std::fmt::{Debug, Formatter};

use crate::{AppError, AppResult};

/// Username and password pair handed to the authentication backend.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: String,
}

impl LoginCredentials {
    /// Creates credentials, rejecting blank usernames and empty passwords.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> AppResult<Self> {
        let username = username.into().trim().to_owned();
        let password = password.into();

        if username.is_empty() {
            return Err(AppError::Validation("username must not be empty".to_owned()));
        }

        if password.is_empty() {
            return Err(AppError::Validation("password must not be empty".to_owned()));
        }

        Ok(Self { username, password })
    }

    /// Returns the trimmed login name.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Returns the plaintext password.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl Debug for LoginCredentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::LoginCredentials;

    #[test]
    fn credentials_trim_username() {
        let credentials =
            LoginCredentials::new("  gate.keeper ", "secret").unwrap_or_else(|_| panic!("test"));
        assert_eq!(credentials.username(), "gate.keeper");
    }

    #[test]
    fn blank_username_is_rejected() {
        assert!(LoginCredentials::new("   ", "secret").is_err());
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(LoginCredentials::new("gate.keeper", "").is_err());
    }

    #[test]
    fn debug_output_hides_password() {
        let credentials =
            LoginCredentials::new("gate.keeper", "hunter2").unwrap_or_else(|_| panic!("test"));
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("gate.keeper"));
    }
}

//! Login gate
//!
//! Compares the entered pair against a single configured credential pair.
//! There is no server round-trip and no hashing. It is not real
//! authentication.

use crate::chat::User;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Username and password are required")]
    MissingFields,
    #[error("Credenciales incorrectas. Por favor, inténtalo de nuevo.")]
    InvalidCredentials,
}

/// The accepted username/password pair
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check an entered pair. Surrounding whitespace is ignored.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let (username, password) = (username.trim(), password.trim());
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if username != self.username || password != self.password {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(User::authenticated(username))
    }
}

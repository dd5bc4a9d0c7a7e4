//! Registration and login flows.
//!
//! # Responsibility
//! - Validate credentials and enforce the shared error taxonomy.
//! - Host both observed variants: local user registry and backend-issued
//!   tokens.
//!
//! # Invariants
//! - Validation failures abort the operation before any state mutates.
//! - Passwords never persist in clear text; only the SHA-256 digest does.
//! - Every error is terminal for the triggering action only.

use crate::db::DbError;
use crate::storage::StorageError;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod local;
pub mod remote;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Authentication/registration error taxonomy.
#[derive(Debug)]
pub enum AuthError {
    /// Required field missing or blank.
    MissingField(&'static str),
    /// Password and confirmation differ.
    PasswordMismatch,
    PasswordTooShort {
        min: usize,
    },
    InvalidEmail(String),
    /// Email already registered (conflict).
    EmailTaken(String),
    InvalidCredentials,
    /// Backend rejected the request with a detail message.
    Backend(String),
    /// Connectivity failure; single attempt, no retry.
    Network(String),
    Storage(StorageError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::PasswordMismatch => write!(f, "passwords do not match"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::InvalidEmail(email) => write!(f, "invalid email address: `{email}`"),
            Self::EmailTaken(email) => write!(f, "email already registered: `{email}`"),
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::Backend(detail) => write!(f, "registration backend rejected request: {detail}"),
            Self::Network(detail) => write!(f, "connection failed: {detail}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for AuthError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<DbError> for AuthError {
    fn from(value: DbError) -> Self {
        Self::Storage(StorageError::Db(value))
    }
}

/// Registration input, as submitted by the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Active session persisted under `grafiter_session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub logged_in_at: DateTime<Utc>,
}

/// Validates a registration request without touching storage.
pub fn validate_registration(request: &RegistrationRequest) -> Result<(), AuthError> {
    if request.username.trim().is_empty() {
        return Err(AuthError::MissingField("username"));
    }
    if request.email.trim().is_empty() {
        return Err(AuthError::MissingField("email"));
    }
    if request.password.is_empty() {
        return Err(AuthError::MissingField("password"));
    }
    if request.password != request.confirm_password {
        return Err(AuthError::PasswordMismatch);
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    if !EMAIL_RE.is_match(request.email.trim()) {
        return Err(AuthError::InvalidEmail(request.email.clone()));
    }
    Ok(())
}

/// SHA-256 digest of a password, hex-encoded.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::{hash_password, validate_registration, AuthError, RegistrationRequest};

    fn request() -> RegistrationRequest {
        RegistrationRequest {
            username: "maria".to_string(),
            email: "maria@example.com".to_string(),
            password: "secret99".to_string(),
            confirm_password: "secret99".to_string(),
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(validate_registration(&request()).is_ok());
    }

    #[test]
    fn mismatch_beats_length_check() {
        let bad = RegistrationRequest {
            password: "abc".to_string(),
            confirm_password: "abd".to_string(),
            ..request()
        };
        assert!(matches!(
            validate_registration(&bad),
            Err(AuthError::PasswordMismatch)
        ));
    }

    #[test]
    fn short_password_is_rejected() {
        let bad = RegistrationRequest {
            password: "abc12".to_string(),
            confirm_password: "abc12".to_string(),
            ..request()
        };
        assert!(matches!(
            validate_registration(&bad),
            Err(AuthError::PasswordTooShort { min: 6 })
        ));
    }

    #[test]
    fn malformed_email_is_rejected() {
        let bad = RegistrationRequest {
            email: "not-an-email".to_string(),
            ..request()
        };
        assert!(matches!(
            validate_registration(&bad),
            Err(AuthError::InvalidEmail(_))
        ));
    }

    #[test]
    fn hashing_is_deterministic_and_not_cleartext() {
        let digest = hash_password("secret99");
        assert_eq!(digest, hash_password("secret99"));
        assert_ne!(digest, "secret99");
        assert_eq!(digest.len(), 64);
    }
}

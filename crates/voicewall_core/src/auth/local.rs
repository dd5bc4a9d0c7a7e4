//! First-variant auth: user registry in local storage.
//!
//! # Responsibility
//! - Register users into the `grafiter_users` array.
//! - Check credentials and persist the active session.
//!
//! # Invariants
//! - Duplicate emails are a conflict; the registry is left untouched.
//! - A corrupt registry document recovers to empty (logged), matching the
//!   crate-wide deserialization policy.

use crate::auth::{
    hash_password, validate_registration, AuthError, RegistrationRequest, Session,
};
use crate::storage::kv::KvStore;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const USERS_KEY: &str = "grafiter_users";
pub const SESSION_KEY: &str = "grafiter_session";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredUser {
    username: String,
    email: String,
    /// SHA-256 hex digest, never the clear text.
    password: String,
}

/// Local-registry authentication service.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalAuth;

impl LocalAuth {
    pub fn new() -> Self {
        Self
    }

    /// Registers a new user. Validation and conflicts abort before any
    /// write.
    pub fn register<S: KvStore>(
        &self,
        kv: &mut S,
        request: &RegistrationRequest,
    ) -> Result<(), AuthError> {
        validate_registration(request)?;

        let email = request.email.trim().to_string();
        let mut users = load_users(kv);
        if users.iter().any(|user| user.email == email) {
            return Err(AuthError::EmailTaken(email));
        }

        users.push(StoredUser {
            username: request.username.trim().to_string(),
            email: email.clone(),
            password: hash_password(&request.password),
        });
        save_users(kv, &users)?;

        info!("event=user_registered module=auth status=ok");
        Ok(())
    }

    /// Checks credentials and persists the session on success.
    pub fn login<S: KvStore>(
        &self,
        kv: &mut S,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let users = load_users(kv);
        let digest = hash_password(password);
        let user = users
            .iter()
            .find(|user| user.email == email.trim() && user.password == digest)
            .ok_or(AuthError::InvalidCredentials)?;

        let session = Session {
            email: user.email.clone(),
            username: Some(user.username.clone()),
            logged_in_at: now,
        };
        let raw = serde_json::to_string(&session).map_err(crate::storage::StorageError::from)?;
        kv.put(SESSION_KEY, &raw)?;

        info!("event=user_login module=auth status=ok");
        Ok(session)
    }

    /// Returns the persisted session, if any. Fails soft.
    pub fn session<S: KvStore>(&self, kv: &S) -> Option<Session> {
        let raw = kv.get(SESSION_KEY).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                warn!(
                    "event=session_load module=auth status=error error_code=corrupt_json error={err}"
                );
                None
            }
        }
    }

    /// Drops the persisted session.
    pub fn logout<S: KvStore>(&self, kv: &mut S) -> Result<(), AuthError> {
        kv.remove(SESSION_KEY)?;
        Ok(())
    }
}

fn load_users<S: KvStore>(kv: &S) -> Vec<StoredUser> {
    let raw = match kv.get(USERS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(
                "event=users_load module=auth status=error error_code=kv_read_failed error={err}"
            );
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(users) => users,
        Err(err) => {
            warn!("event=users_load module=auth status=error error_code=corrupt_json error={err}");
            Vec::new()
        }
    }
}

fn save_users<S: KvStore>(kv: &mut S, users: &[StoredUser]) -> Result<(), AuthError> {
    let raw = serde_json::to_string(users).map_err(crate::storage::StorageError::from)?;
    kv.put(USERS_KEY, &raw)?;
    Ok(())
}

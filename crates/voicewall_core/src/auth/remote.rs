//! Second-variant auth: backend-issued bearer tokens.
//!
//! # Responsibility
//! - Talk to the registration backend (`/register`, `/token`).
//! - Persist the issued token under `grafiter_token`.
//!
//! # Invariants
//! - One blocking attempt per operation; no retry, no custom timeout.
//! - Transport failures surface as a generic connectivity error; backend
//!   rejections carry the `detail` message when present.

use crate::auth::{validate_registration, AuthError, RegistrationRequest};
use crate::storage::kv::KvStore;
use log::info;
use serde::{Deserialize, Serialize};

pub const TOKEN_KEY: &str = "grafiter_token";

#[derive(Debug, Serialize)]
struct RegisterPayload<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct TokenPayload<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct BackendReply {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Seam for the registration backend; tests plug a stub in here.
pub trait AuthBackend {
    fn register(&self, request: &RegistrationRequest) -> Result<(), AuthError>;
    fn token(&self, email: &str, password: &str) -> Result<String, AuthError>;
}

/// HTTP implementation of the backend contract.
pub struct HttpAuthBackend {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpAuthBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            agent: ureq::agent(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

impl AuthBackend for HttpAuthBackend {
    fn register(&self, request: &RegistrationRequest) -> Result<(), AuthError> {
        let payload = RegisterPayload {
            username: request.username.trim(),
            email: request.email.trim(),
            password: &request.password,
        };

        match self.agent.post(&self.endpoint("register")).send_json(payload) {
            Ok(_) => Ok(()),
            Err(err) => Err(backend_error(err)),
        }
    }

    fn token(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let payload = TokenPayload {
            email: email.trim(),
            password,
        };

        let reply: BackendReply = match self.agent.post(&self.endpoint("token")).send_json(payload)
        {
            Ok(response) => response
                .into_json()
                .map_err(|err| AuthError::Network(err.to_string()))?,
            Err(err) => return Err(backend_error(err)),
        };

        reply.access_token.ok_or_else(|| {
            AuthError::Backend(
                reply
                    .detail
                    .unwrap_or_else(|| "token missing from response".to_string()),
            )
        })
    }
}

fn backend_error(err: ureq::Error) -> AuthError {
    match err {
        ureq::Error::Status(code, response) => {
            let detail = response
                .into_json::<BackendReply>()
                .ok()
                .and_then(|reply| reply.detail)
                .unwrap_or_else(|| format!("request failed with status {code}"));
            AuthError::Backend(detail)
        }
        ureq::Error::Transport(transport) => AuthError::Network(transport.to_string()),
    }
}

/// Token-based authentication flow over any backend implementation.
pub struct RemoteAuth<B: AuthBackend> {
    backend: B,
}

impl<B: AuthBackend> RemoteAuth<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Validates locally, then registers against the backend.
    pub fn register(&self, request: &RegistrationRequest) -> Result<(), AuthError> {
        validate_registration(request)?;
        self.backend.register(request)?;
        info!("event=user_registered module=auth status=ok variant=remote");
        Ok(())
    }

    /// Exchanges credentials for a bearer token and persists it.
    pub fn login<S: KvStore>(
        &self,
        kv: &mut S,
        email: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let token = self.backend.token(email, password)?;
        kv.put(TOKEN_KEY, &token)?;

        info!("event=user_login module=auth status=ok variant=remote");
        Ok(token)
    }

    /// Returns the persisted bearer token, if any.
    pub fn token<S: KvStore>(&self, kv: &S) -> Option<String> {
        kv.get(TOKEN_KEY).ok().flatten()
    }

    /// Drops the persisted bearer token.
    pub fn logout<S: KvStore>(&self, kv: &mut S) -> Result<(), AuthError> {
        kv.remove(TOKEN_KEY)?;
        Ok(())
    }
}

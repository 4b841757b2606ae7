//! Authentication: credential headers and the auth endpoint client.
//!
//! [`ApiAuth`] attaches the public API key and, once signed in, the user's
//! bearer token to every backend request. [`AuthClient`] wraps the auth
//! subsystem endpoints (sign in/up/out, password operations, session check);
//! session *state* lives in [`crate::SessionManager`], not here.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{extract_error_message, Result, VizinhaLinkError};

/// Credential layer applied to every backend request.
///
/// Anonymous requests authenticate with the public API key alone; after
/// sign-in the user's access token replaces the key in the bearer slot so
/// row policies evaluate against the signed-in identity. Cloning shares the
/// token cell, so the session manager and every executor see the same
/// credential state.
#[derive(Clone)]
pub struct ApiAuth {
    api_key: String,
    access_token: Arc<RwLock<Option<String>>>,
}

impl ApiAuth {
    pub(crate) fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            access_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Attach credential headers to an HTTP request builder.
    ///
    /// - `apikey: <public key>` on every request
    /// - `Authorization: Bearer <access token>` when signed in,
    ///   `Bearer <public key>` otherwise
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("apikey", self.api_key.clone());
        match self.current_token() {
            Some(token) => request.bearer_auth(token),
            None => request.bearer_auth(self.api_key.clone()),
        }
    }

    /// Install the signed-in user's access token
    pub fn set_access_token(&self, token: impl Into<String>) {
        *self.write_guard() = Some(token.into());
    }

    /// Drop the signed-in token, reverting to anonymous key-only requests
    pub fn clear_access_token(&self) {
        *self.write_guard() = None;
    }

    /// True when a user access token is installed
    pub fn has_session_token(&self) -> bool {
        self.current_token().is_some()
    }

    fn current_token(&self) -> Option<String> {
        match self.access_token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, Option<String>> {
        match self.access_token.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// The auth identity behind a session. Distinct from the `usuario` profile
/// row, which carries the community-facing fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated session as returned by the auth endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

impl AuthSession {
    /// Absolute expiry instant derived from `expires_in`
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_in.map(|secs| Utc::now() + Duration::seconds(secs))
    }
}

#[derive(Serialize)]
struct EmailPassword<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct EmailOnly<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct PasswordOnly<'a> {
    password: &'a str,
}

/// Raw sign-up response: a full session when confirmations are disabled,
/// otherwise just the created identity.
#[derive(Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    user: Option<AuthUser>,
    // identity-only shape (confirmation pending)
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Client for the backend auth subsystem (`/auth/v1/...`).
#[derive(Clone)]
pub struct AuthClient {
    base_url: String,
    http_client: reqwest::Client,
    api_key: String,
}

impl AuthClient {
    pub(crate) fn new(
        base_url: impl Into<String>,
        http_client: reqwest::Client,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", self.api_key.clone())
    }

    /// Map a non-success auth response into an `AuthenticationError`,
    /// preserving the backend message.
    async fn check(action: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        Err(VizinhaLinkError::AuthenticationError(format!(
            "{} failed ({}): {}",
            action, status, message
        )))
    }

    /// Register a new auth identity.
    ///
    /// Returns the session when the backend signs the user in immediately;
    /// errors when the backend withholds a session pending email
    /// confirmation, since the caller cannot proceed without a token.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession> {
        debug!("[AUTH] sign_up email={}", email);
        let response = self
            .request(self.http_client.post(self.url("signup")))
            .json(&EmailPassword { email, password })
            .send()
            .await?;
        let response = Self::check("sign-up", response).await?;
        let raw: SignUpResponse = response.json().await?;

        match (raw.access_token, raw.user) {
            (Some(access_token), Some(user)) => Ok(AuthSession {
                access_token,
                refresh_token: raw.refresh_token,
                expires_in: raw.expires_in,
                user,
            }),
            _ => {
                let who = raw.email.or(raw.id).unwrap_or_default();
                Err(VizinhaLinkError::AuthenticationError(format!(
                    "sign-up for {} accepted but returned no session; confirm the email and sign in",
                    who
                )))
            }
        }
    }

    /// Exchange email + password for a session.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        debug!("[AUTH] sign_in email={}", email);
        let response = self
            .request(
                self.http_client
                    .post(self.url("token"))
                    .query(&[("grant_type", "password")]),
            )
            .json(&EmailPassword { email, password })
            .send()
            .await?;
        let response = Self::check("sign-in", response).await?;
        Ok(response.json::<AuthSession>().await?)
    }

    /// Fetch the identity behind an access token. Used by bootstrap to
    /// validate a restored session.
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser> {
        let response = self
            .request(self.http_client.get(self.url("user")))
            .bearer_auth(access_token)
            .send()
            .await?;
        let response = Self::check("session check", response).await?;
        Ok(response.json::<AuthUser>().await?)
    }

    /// Revoke the session behind an access token.
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let response = self
            .request(self.http_client.post(self.url("logout")))
            .bearer_auth(access_token)
            .send()
            .await?;
        Self::check("sign-out", response).await?;
        Ok(())
    }

    /// Send a password-recovery email.
    pub async fn reset_password_for_email(&self, email: &str) -> Result<()> {
        let response = self
            .request(self.http_client.post(self.url("recover")))
            .json(&EmailOnly { email })
            .send()
            .await?;
        Self::check("password recovery", response).await?;
        Ok(())
    }

    /// Change the signed-in user's password.
    pub async fn update_password(&self, access_token: &str, new_password: &str) -> Result<()> {
        let response = self
            .request(self.http_client.put(self.url("user")))
            .bearer_auth(access_token)
            .json(&PasswordOnly {
                password: new_password,
            })
            .send()
            .await?;
        Self::check("password update", response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_requests_use_api_key_as_bearer() {
        let auth = ApiAuth::new("anon-key");
        let client = reqwest::Client::new();
        let request = auth
            .apply_to_request(client.get("http://localhost:9"))
            .build()
            .unwrap();

        assert_eq!(request.headers().get("apikey").unwrap(), "anon-key");
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer anon-key"
        );
    }

    #[test]
    fn test_signed_in_requests_use_access_token() {
        let auth = ApiAuth::new("anon-key");
        auth.set_access_token("user-token");
        assert!(auth.has_session_token());

        let client = reqwest::Client::new();
        let request = auth
            .apply_to_request(client.get("http://localhost:9"))
            .build()
            .unwrap();

        assert_eq!(request.headers().get("apikey").unwrap(), "anon-key");
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer user-token"
        );
    }

    #[test]
    fn test_clearing_token_reverts_to_anonymous() {
        let auth = ApiAuth::new("anon-key");
        auth.set_access_token("user-token");
        auth.clear_access_token();
        assert!(!auth.has_session_token());
    }

    #[test]
    fn test_token_cell_is_shared_between_clones() {
        let auth = ApiAuth::new("anon-key");
        let clone = auth.clone();
        auth.set_access_token("user-token");
        assert!(clone.has_session_token());
    }

    #[test]
    fn test_auth_session_expiry_from_expires_in() {
        let session = AuthSession {
            access_token: "t".into(),
            refresh_token: None,
            expires_in: Some(3600),
            user: AuthUser {
                id: "u-1".into(),
                email: None,
            },
        };
        let expires_at = session.expires_at().unwrap();
        assert!(expires_at > Utc::now());
    }

    #[test]
    fn test_sign_up_response_shapes() {
        // full session (confirmations disabled)
        let with_session: SignUpResponse = serde_json::from_str(
            r#"{"access_token":"t","refresh_token":"r","expires_in":3600,
                "user":{"id":"u-1","email":"a@b.c"}}"#,
        )
        .unwrap();
        assert!(with_session.access_token.is_some());
        assert!(with_session.user.is_some());

        // identity only (confirmation pending)
        let pending: SignUpResponse =
            serde_json::from_str(r#"{"id":"u-1","email":"a@b.c"}"#).unwrap();
        assert!(pending.access_token.is_none());
        assert_eq!(pending.email.as_deref(), Some("a@b.c"));
    }
}

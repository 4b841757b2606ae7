//! Session and authentication state management.
//!
//! [`SessionManager`] is the single writer of the process-wide
//! [`SessionState`]. Every transition publishes one complete state value
//! through a watch cell, so observers never see the authenticated flag,
//! the verified flag and the cached profile disagree with each other.
//!
//! Failure handling is deliberately asymmetric:
//! - [`SessionManager::bootstrap`] absorbs every failure and settles to
//!   anonymous — a passive startup check must never take the app down;
//! - [`SessionManager::load_user`] propagates failures to the caller;
//! - explicit user actions (sign-in, sign-up, password operations) surface
//!   failures as `Err` for the caller to display.

use std::sync::{Arc, Mutex};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::timeout;

use crate::auth::{ApiAuth, AuthClient, AuthSession};
use crate::error::{Result, VizinhaLinkError};
use crate::models::usuario::{Perfil, Usuario, UsuarioCreate};
use crate::services::usuario::UsuarioService;
use crate::timeouts::VizinhaLinkTimeouts;

/// Current session state, published as one value per transition.
///
/// `is_verified` is an attribute of the authenticated state, not a state of
/// its own; it is informational only and gates nothing.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Cached profile of the signed-in resident
    pub current_user: Option<Usuario>,
    pub is_authenticated: bool,
    pub is_verified: bool,
    /// True while an explicit sign-in/sign-up is in flight. Bootstrap does
    /// not raise it, so route guards evaluated at startup see a settled
    /// anonymous state instead of blocking on a pending check.
    pub is_loading: bool,
}

impl SessionState {
    fn authenticating() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    fn authenticated(usuario: Usuario) -> Self {
        let is_verified = usuario.verificado;
        Self {
            current_user: Some(usuario),
            is_authenticated: true,
            is_verified,
            is_loading: false,
        }
    }
}

/// A session persisted across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user_id: String,
    pub email: Option<String>,
}

/// Storage backend for the persisted session.
///
/// Implementations decide where the session lives (memory, a file with
/// restrictive permissions, a platform keychain). Tokens must never be
/// logged.
pub trait SessionStore: Send + Sync {
    /// Retrieve the persisted session, if any
    fn load(&self) -> Result<Option<StoredSession>>;

    /// Persist a session, replacing any previous one
    fn save(&self, session: &StoredSession) -> Result<()>;

    /// Forget the persisted session. Succeeds even when none is stored.
    fn clear(&self) -> Result<()>;
}

/// In-memory session store. Does not survive restarts; the default for
/// tests and for hosts that manage persistence themselves.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, Option<StoredSession>> {
        match self.session.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self.guard().clone())
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        *self.guard() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.guard() = None;
        Ok(())
    }
}

/// Owns and mutates the session state; everything else only reads it.
pub struct SessionManager {
    auth: AuthClient,
    api_auth: ApiAuth,
    usuarios: UsuarioService,
    store: Arc<dyn SessionStore>,
    state: watch::Sender<SessionState>,
    timeouts: VizinhaLinkTimeouts,
}

impl SessionManager {
    pub(crate) fn new(
        auth: AuthClient,
        api_auth: ApiAuth,
        usuarios: UsuarioService,
        store: Arc<dyn SessionStore>,
        timeouts: VizinhaLinkTimeouts,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            auth,
            api_auth,
            usuarios,
            store,
            state,
            timeouts,
        }
    }

    /// Observe state transitions. Each received value is one complete,
    /// self-consistent state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<Usuario> {
        self.state.borrow().current_user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn is_verified(&self) -> bool {
        self.state.borrow().is_verified
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    fn publish(&self, next: SessionState) {
        self.state.send_replace(next);
    }

    fn settle_anonymous(&self) {
        self.publish(SessionState::default());
    }

    fn install_session(&self, session: &AuthSession) {
        self.api_auth.set_access_token(session.access_token.clone());
        let stored = StoredSession {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            user_id: session.user.id.clone(),
            email: session.user.email.clone(),
        };
        if let Err(err) = self.store.save(&stored) {
            warn!("[SESSION] could not persist session: {}", err);
        }
    }

    /// Restore a persisted session at startup. Never fails: any missing,
    /// rejected or slow-to-validate session settles the state to anonymous.
    ///
    /// The session check is bounded by `timeouts.session_timeout`, so a
    /// dead backend cannot hang startup.
    pub async fn bootstrap(&self) {
        let stored = match self.store.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                self.settle_anonymous();
                return;
            }
            Err(err) => {
                debug!("[SESSION] session store unreadable: {}", err);
                self.settle_anonymous();
                return;
            }
        };

        let user = match timeout(
            self.timeouts.session_timeout,
            self.auth.get_user(&stored.access_token),
        )
        .await
        {
            Ok(Ok(user)) => user,
            Ok(Err(err)) => {
                debug!("[SESSION] stored session rejected: {}", err);
                let _ = self.store.clear();
                self.settle_anonymous();
                return;
            }
            Err(_) => {
                debug!("[SESSION] session check timed out; settling to anonymous");
                self.settle_anonymous();
                return;
            }
        };

        self.api_auth.set_access_token(stored.access_token.clone());
        if let Err(err) = self.load_user(&user.id).await {
            warn!("[SESSION] profile load during bootstrap failed: {}", err);
            self.api_auth.clear_access_token();
            self.settle_anonymous();
        }
    }

    /// Load (or reload) the profile of `user_id` into the session state.
    ///
    /// Tries the fast relation-less fetch first and falls back to the
    /// embedded fetch only when that fails. Unlike bootstrap, failures here
    /// propagate: callers triggered this deliberately and decide what to do.
    pub async fn load_user(&self, user_id: &str) -> Result<()> {
        let usuario = match self.usuarios.find_by_id(user_id, false).await {
            Ok(usuario) => usuario,
            Err(err) => {
                warn!(
                    "[SESSION] plain profile fetch failed ({}); retrying with relations",
                    err
                );
                self.usuarios.find_by_id(user_id, true).await?
            }
        };
        self.publish(SessionState::authenticated(usuario));
        Ok(())
    }

    /// Sign in with email and password.
    ///
    /// The auth exchange is bounded by `timeouts.sign_in_timeout`. The
    /// follow-up profile load gets its own, shorter bound
    /// (`timeouts.load_user_timeout`); if it fails or expires the sign-in
    /// still succeeds with an unverified minimal profile synthesized from
    /// the email — availability over completeness.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        self.publish(SessionState::authenticating());

        let session = match timeout(
            self.timeouts.sign_in_timeout,
            self.auth.sign_in_with_password(email, password),
        )
        .await
        {
            Ok(Ok(session)) => session,
            Ok(Err(err)) => {
                self.settle_anonymous();
                return Err(err);
            }
            Err(_) => {
                self.settle_anonymous();
                return Err(VizinhaLinkError::TimeoutError(
                    "timed out signing in".to_string(),
                ));
            }
        };

        self.install_session(&session);

        let loaded = timeout(
            self.timeouts.load_user_timeout,
            self.load_user(&session.user.id),
        )
        .await;
        let failure = match loaded {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err.to_string()),
            Err(_) => Some("profile load timed out".to_string()),
        };
        if let Some(reason) = failure {
            warn!(
                "[SESSION] full profile unavailable after sign-in ({}); using minimal profile",
                reason
            );
            let known_email = session.user.email.as_deref().unwrap_or(email);
            self.publish(SessionState::authenticated(Usuario::minimal(
                session.user.id.clone(),
                known_email,
            )));
        }

        Ok(())
    }

    /// Register a new resident: auth identity first, then the profile row
    /// through the privileged creation path (see
    /// `UsuarioService::create_with_id`).
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        nome: &str,
        perfil: Perfil,
    ) -> Result<()> {
        self.publish(SessionState::authenticating());

        let session = match self.auth.sign_up(email, password).await {
            Ok(session) => session,
            Err(err) => {
                self.settle_anonymous();
                return Err(err);
            }
        };

        self.install_session(&session);

        let create = UsuarioCreate {
            nome: nome.to_string(),
            email: email.to_string(),
            perfil: Some(perfil),
            verificado: Some(false),
            ..UsuarioCreate::default()
        };
        match self.usuarios.create_with_id(&session.user.id, create).await {
            Ok(usuario) => {
                self.publish(SessionState::authenticated(usuario));
                Ok(())
            }
            Err(err) => {
                // The auth identity exists and the session stays stored so a
                // later bootstrap can recover, but the state the app sees is
                // anonymous until the profile exists.
                self.settle_anonymous();
                Err(err)
            }
        }
    }

    /// Sign out: best-effort backend revocation, then local cleanup. The
    /// local state always ends anonymous, even when the backend call fails.
    pub async fn sign_out(&self) {
        if let Ok(Some(stored)) = self.store.load() {
            if let Err(err) = self.auth.sign_out(&stored.access_token).await {
                warn!("[SESSION] backend sign-out failed: {}", err);
            }
        }
        if let Err(err) = self.store.clear() {
            warn!("[SESSION] could not clear stored session: {}", err);
        }
        self.api_auth.clear_access_token();
        self.settle_anonymous();
    }

    /// Send a password-recovery email.
    pub async fn reset_password(&self, email: &str) -> Result<()> {
        self.auth.reset_password_for_email(email).await
    }

    /// Change the signed-in user's password.
    pub async fn update_password(&self, new_password: &str) -> Result<()> {
        let stored = self.store.load()?.ok_or_else(|| {
            VizinhaLinkError::AuthenticationError("no active session".to_string())
        })?;
        self.auth.update_password(&stored.access_token, new_password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load().unwrap(), None);

        let session = StoredSession {
            access_token: "t".into(),
            refresh_token: Some("r".into()),
            user_id: "u-1".into(),
            email: Some("ana@example.com".into()),
        };
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_authenticated_state_carries_verified_flag() {
        let mut usuario = Usuario::minimal("u-1", "ana@example.com");
        usuario.verificado = true;
        let state = SessionState::authenticated(usuario);
        assert!(state.is_authenticated);
        assert!(state.is_verified);
        assert!(!state.is_loading);
        assert!(state.current_user.is_some());
    }

    #[test]
    fn test_default_state_is_anonymous_and_settled() {
        let state = SessionState::default();
        assert!(!state.is_authenticated);
        assert!(!state.is_verified);
        assert!(!state.is_loading);
        assert!(state.current_user.is_none());
    }

    #[test]
    fn test_authenticating_state_is_loading_only() {
        let state = SessionState::authenticating();
        assert!(state.is_loading);
        assert!(!state.is_authenticated);
        assert!(state.current_user.is_none());
    }
}

// SPDX-License-Identifier: MIT

//! Session store: the single place the current auth session lives.
//!
//! One instance is constructed at app start, owned by the application root,
//! and handed to consumers by reference. State changes are broadcast over a
//! watch channel (the auth-state-change notification); dropping the store
//! tears the channel down.

use crate::error::Result;
use crate::models::Session;
use crate::services::auth::AuthClient;
use crate::storage::SessionStorage;
use chrono::Utc;
use tokio::sync::watch;

/// Observable authentication state.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Initial state, before the persisted session has been checked
    Loading,
    Authenticated(Session),
    Unauthenticated,
}

/// Process-wide session store.
pub struct SessionStore {
    auth: AuthClient,
    storage: SessionStorage,
    state: watch::Sender<AuthState>,
}

impl SessionStore {
    /// Create the store in the `Loading` state.
    pub fn new(auth: AuthClient, storage: SessionStorage) -> Self {
        let (state, _) = watch::channel(AuthState::Loading);
        Self {
            auth,
            storage,
            state,
        }
    }

    /// Restore the persisted session, refreshing it when expired. Leaves
    /// the store `Authenticated` or `Unauthenticated`, never `Loading`.
    pub async fn initialize(&self) {
        let Some(persisted) = self.storage.load().await else {
            self.apply_auth_change(None).await;
            return;
        };

        if !persisted.is_expired(Utc::now()) {
            tracing::info!(user_id = %persisted.user.id, "Restored persisted session");
            self.apply_auth_change(Some(persisted)).await;
            return;
        }

        match self.auth.refresh_session(&persisted.refresh_token).await {
            Ok(session) => {
                tracing::info!(user_id = %session.user.id, "Persisted session refreshed");
                self.apply_auth_change(Some(session)).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Persisted session could not be refreshed");
                self.apply_auth_change(None).await;
            }
        }
    }

    /// Replace the session unconditionally. This is the auth-state-change
    /// entry point: sign-in, sign-out and token refresh all land here, and
    /// the persisted copy is kept in sync.
    pub async fn apply_auth_change(&self, session: Option<Session>) {
        match &session {
            Some(s) => {
                if let Err(e) = self.storage.save(s).await {
                    tracing::warn!(error = %e, "Failed to persist session");
                }
            }
            None => {
                if let Err(e) = self.storage.clear().await {
                    tracing::warn!(error = %e, "Failed to clear persisted session");
                }
            }
        }

        let next = match session {
            Some(s) => AuthState::Authenticated(s),
            None => AuthState::Unauthenticated,
        };
        self.state.send_replace(next);
    }

    /// Register a new account. No session results until the email is
    /// confirmed.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        self.auth.sign_up(email, password).await
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        let session = self.auth.sign_in_with_password(email, password).await?;
        tracing::info!(user_id = %session.user.id, "Signed in");
        self.apply_auth_change(Some(session)).await;
        Ok(())
    }

    /// Sign out. Local state is cleared even when remote revocation fails;
    /// the stale server-side token expires on its own.
    pub async fn sign_out(&self) {
        if let Some(session) = self.session() {
            if let Err(e) = self.auth.sign_out(&session.access_token).await {
                tracing::warn!(error = %e, "Remote sign-out failed, clearing local session anyway");
            }
        }
        self.apply_auth_change(None).await;
        tracing::info!("Signed out");
    }

    /// Handle an inbound deep link carrying auth tokens in its fragment.
    ///
    /// Missing or malformed fragments are a no-op; a failed token exchange
    /// is logged and leaves the current session unchanged. Never an error
    /// for the caller.
    pub async fn handle_deep_link(&self, url: &str) {
        let Some((access_token, refresh_token)) = parse_fragment_tokens(url) else {
            tracing::debug!("Deep link without auth tokens ignored");
            return;
        };

        match self.auth.set_session(&access_token, &refresh_token).await {
            Ok(session) => {
                tracing::info!(user_id = %session.user.id, "Session set from deep link");
                self.apply_auth_change(Some(session)).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Deep link token exchange failed");
            }
        }
    }

    /// Current session, if authenticated.
    pub fn session(&self) -> Option<Session> {
        match &*self.state.borrow() {
            AuthState::Authenticated(session) => Some(session.clone()),
            _ => None,
        }
    }

    /// True until `initialize` has resolved the persisted session.
    pub fn is_loading(&self) -> bool {
        matches!(&*self.state.borrow(), AuthState::Loading)
    }

    /// Subscribe to auth-state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

/// Extract `access_token` and `refresh_token` from a deep link's URL
/// fragment (the part after `#`, formatted as a query string). Returns
/// `None` unless both tokens are present and non-empty.
pub fn parse_fragment_tokens(url: &str) -> Option<(String, String)> {
    let (_, fragment) = url.split_once('#')?;

    let mut access_token = None;
    let mut refresh_token = None;

    for pair in fragment.split('&') {
        let (key, value) = pair.split_once('=')?;
        let value = urlencoding::decode(value).ok()?;
        match key {
            "access_token" => access_token = Some(value.into_owned()),
            "refresh_token" => refresh_token = Some(value.into_owned()),
            _ => {}
        }
    }

    match (access_token, refresh_token) {
        (Some(a), Some(r)) if !a.is_empty() && !r.is_empty() => Some((a, r)),
        _ => None,
    }
}

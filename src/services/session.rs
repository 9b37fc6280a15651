// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Operator authentication session.
//!
//! The session is the single source of truth for "is an operator logged
//! in". It moves through three states:
//!
//! ```text
//! Initializing ──initialize()──> Authenticated(user) | Unauthenticated
//! Unauthenticated ──login() ok──> Authenticated(user)
//! Authenticated ──logout() / expire()──> Unauthenticated
//! ```
//!
//! Every transition (and every write to the token store it implies) happens
//! under the state channel's write lock and bumps an epoch counter. A login
//! or startup check that resolves after the epoch moved is discarded, so a
//! late response can never resurrect a session the operator already left.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ApiError;
use crate::models::{LoginResponse, User};
use crate::services::backend::ApiClient;
use crate::services::token_store::{StoreError, TokenStore};

/// Session state observed by the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Startup check of the persisted token has not finished.
    Initializing,
    Unauthenticated,
    Authenticated(User),
}

/// Session errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("An operator is already logged in")]
    AlreadyAuthenticated,

    #[error("Session is still initializing")]
    NotReady,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Authentication session shared by the view layer.
pub struct AuthSession {
    client: ApiClient,
    store: Arc<TokenStore>,
    state: watch::Sender<AuthState>,
    epoch: AtomicU64,
}

impl AuthSession {
    /// Create a session in the `Initializing` state over the client's token store.
    pub fn new(client: ApiClient) -> Self {
        let store = client.token_store().clone();
        let (state, _) = watch::channel(AuthState::Initializing);
        Self {
            client,
            store,
            state,
            epoch: AtomicU64::new(0),
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────────

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        match &*self.state.borrow() {
            AuthState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.borrow(), AuthState::Authenticated(_))
    }

    /// Protected content must not be rendered while this is true.
    pub fn is_initializing(&self) -> bool {
        matches!(*self.state.borrow(), AuthState::Initializing)
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    // ─── Commands ────────────────────────────────────────────────────────────

    /// Validate the persisted token with the backend.
    ///
    /// Without a token this settles to `Unauthenticated` without any network
    /// call. A token the backend does not accept is cleared. Once settled,
    /// further calls return the current state.
    pub async fn initialize(&self) -> AuthState {
        let epoch = self.epoch.load(Ordering::SeqCst);
        if !self.is_initializing() {
            return self.state();
        }

        let Some(token) = self.store.get() else {
            tracing::info!("No stored session token");
            self.settle(epoch, AuthState::Unauthenticated);
            return self.state();
        };

        let next = match self.client.me().await {
            Ok(user) => {
                tracing::info!(
                    user_id = user.id,
                    username = %user.username,
                    "Restored operator session"
                );
                AuthState::Authenticated(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored session token not accepted, clearing");
                self.store.clear_if(&token);
                AuthState::Unauthenticated
            }
        };

        if !self.settle(epoch, next) {
            tracing::debug!("Discarding startup check that finished after a session change");
        }
        self.state()
    }

    /// Log in with operator credentials.
    ///
    /// Returns `Ok(false)` for rejected credentials (a failed envelope or a
    /// 4xx status). Transport failures, 5xx statuses and malformed responses
    /// are errors. Logging in again while authenticated is rejected; log out
    /// first.
    pub async fn login(&self, username: &str, password: &str) -> Result<bool, SessionError> {
        let epoch = {
            let state = self.state.borrow();
            match &*state {
                AuthState::Initializing => return Err(SessionError::NotReady),
                AuthState::Authenticated(_) => return Err(SessionError::AlreadyAuthenticated),
                AuthState::Unauthenticated => self.epoch.load(Ordering::SeqCst),
            }
        };

        let envelope = match self.client.login(username, password).await {
            Ok(envelope) => envelope,
            Err(e) if e.is_client_error() => {
                tracing::info!(username, error = %e, "Login rejected");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let LoginResponse { token, user } = match envelope.into_result() {
            Ok(data) => data,
            Err(ApiError::Application { message, .. }) => {
                tracing::info!(
                    username,
                    message = message.as_deref().unwrap_or(""),
                    "Login rejected"
                );
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let user_id = user.id;
        let mut outcome: Result<bool, StoreError> = Ok(false);
        self.state.send_if_modified(|state| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            if let Err(e) = self.store.replace(token) {
                outcome = Err(e);
                return false;
            }
            self.epoch.fetch_add(1, Ordering::SeqCst);
            *state = AuthState::Authenticated(user);
            outcome = Ok(true);
            true
        });

        let committed = outcome?;
        if committed {
            tracing::info!(user_id, username, "Operator logged in");
        } else {
            tracing::info!(username, "Discarding login that completed after a session change");
        }
        Ok(committed)
    }

    /// Log out immediately.
    ///
    /// Local state is cleared before this returns. The backend is notified in
    /// the background with the old credential; its outcome is ignored. The
    /// returned handle (if a token was stored) completes when that
    /// notification finished.
    pub fn logout(&self) -> Option<JoinHandle<()>> {
        let mut credential = None;
        self.state.send_modify(|state| {
            credential = self.store.clear();
            self.epoch.fetch_add(1, Ordering::SeqCst);
            *state = AuthState::Unauthenticated;
        });
        tracing::info!("Operator logged out");

        let credential = credential?;
        let client = self.client.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = client.logout(&credential).await {
                tracing::debug!(error = %e, "Backend logout notification failed, ignoring");
            }
        }))
    }

    /// Drop the session after the backend rejected its token.
    ///
    /// No-op when already unauthenticated, or when a token is stored again
    /// (the operator logged back in before the rejection was processed).
    pub fn expire(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == AuthState::Unauthenticated || self.store.is_present() {
                return false;
            }
            self.epoch.fetch_add(1, Ordering::SeqCst);
            *state = AuthState::Unauthenticated;
            true
        })
    }

    /// Apply `next` if no other transition happened since `epoch`.
    fn settle(&self, epoch: u64, next: AuthState) -> bool {
        self.state.send_if_modified(|state| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            self.epoch.fetch_add(1, Ordering::SeqCst);
            *state = next;
            true
        })
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("state", &*self.state.borrow())
            .finish()
    }
}

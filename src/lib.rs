// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! VPN admin console: operator session and admin backend access.
//!
//! This crate provides the client side of the VPN service's admin
//! dashboard: an API client for the admin backend, the operator's
//! authentication session, the route guard, and a small local console
//! server that exposes the guarded views.

pub mod config;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use config::Config;
use error::ApiError;
use services::{ApiClient, AuthSession, Navigator, SessionEvent, SessionEvents, TokenStore};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Shared application state, injected into the view layer.
pub struct AppState {
    pub config: Config,
    pub client: ApiClient,
    pub session: AuthSession,
    pub navigator: Navigator,
    pub events: SessionEvents,
}

impl AppState {
    /// Wire the client, session and navigator over `store`.
    pub fn new(config: Config, store: TokenStore) -> Result<Self, ApiError> {
        let events = SessionEvents::new();
        let client = ApiClient::new(&config, Arc::new(store), events.clone())?;
        let session = AuthSession::new(client.clone());

        Ok(Self {
            config,
            client,
            session,
            navigator: Navigator::new(),
            events,
        })
    }

    /// Run the single subscriber that reacts to backend token rejections:
    /// the session expires and the operator is sent to the login view.
    pub fn watch_unauthorized(self: &Arc<Self>) -> JoinHandle<()> {
        let mut events = self.events.subscribe();
        let state = Arc::clone(self);

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::Unauthorized { path }) => {
                        let expired = state.session.expire();
                        let redirected = state.navigator.redirect_to_login();
                        tracing::info!(
                            path = %path,
                            expired,
                            redirected,
                            "Session invalidated by backend"
                        );
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Session events lagged");
                        state.session.expire();
                        state.navigator.redirect_to_login();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

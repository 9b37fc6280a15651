// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Default middleware for the backend client.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;

use crate::error::ApiError;
use crate::services::backend::{Exchange, RequestLayer, ResponseLayer};
use crate::services::events::{SessionEvent, SessionEvents};
use crate::services::token_store::TokenStore;

/// Attaches `Authorization: Bearer <token>` when a token is stored.
///
/// An explicit credential already on the exchange takes precedence.
pub struct BearerAuthLayer {
    store: Arc<TokenStore>,
}

impl BearerAuthLayer {
    pub fn new(store: Arc<TokenStore>) -> Self {
        Self { store }
    }
}

impl RequestLayer for BearerAuthLayer {
    fn on_request(
        &self,
        exchange: &mut Exchange,
        mut request: reqwest::Request,
    ) -> Result<reqwest::Request, ApiError> {
        if exchange.credential.is_none() {
            exchange.credential = self.store.get();
        }

        if let Some(token) = &exchange.credential {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ApiError::InvalidRequest("session token is not a valid header value".to_string())
            })?;
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        Ok(request)
    }
}

/// Invalidates the session when the backend rejects its token with 401.
///
/// The token is cleared only if it is still the one the request carried, so
/// concurrent rejections clear (and notify) once, and a late rejection of an
/// old token never clears a newer one.
pub struct RejectedTokenLayer {
    store: Arc<TokenStore>,
    events: SessionEvents,
}

impl RejectedTokenLayer {
    pub fn new(store: Arc<TokenStore>, events: SessionEvents) -> Self {
        Self { store, events }
    }
}

impl ResponseLayer for RejectedTokenLayer {
    fn on_response(
        &self,
        exchange: &Exchange,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        match exchange.credential.as_deref() {
            Some(token) if self.store.clear_if(token) => {
                tracing::warn!(path = %exchange.path, "Backend rejected session token, cleared");
                self.events.emit(SessionEvent::Unauthorized {
                    path: exchange.path.clone(),
                });
            }
            Some(_) => {
                tracing::debug!(path = %exchange.path, "401 for a token that is no longer stored");
            }
            None => {
                tracing::debug!(path = %exchange.path, "401 for unauthenticated request");
            }
        }

        Err(ApiError::Http {
            status: StatusCode::UNAUTHORIZED.as_u16(),
            body: String::new(),
        })
    }
}

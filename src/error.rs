// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for backend calls and consistent console responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::services::session::SessionError;

/// Failure of a single backend call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// No HTTP response was received (connect failure, reset, timeout).
    #[error("Network error: {message}")]
    Network { timeout: bool, message: String },

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}")]
    Http { status: u16, body: String },

    /// 2xx response whose envelope reports `success: false`.
    #[error("Backend rejected request: {}", message.as_deref().unwrap_or("no message"))]
    Application {
        message: Option<String>,
        errors: Vec<String>,
    },

    #[error("Malformed backend response: {0}")]
    Decode(String),

    /// The request could not be built (bad URL, unserializable body).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub const UNAUTHORIZED: u16 = 401;

    /// Map a transport-level reqwest failure.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ApiError::Decode(err.to_string());
        }
        ApiError::Network {
            timeout: err.is_timeout(),
            message: err.to_string(),
        }
    }

    /// True for an HTTP 401 rejection.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Http { status, .. } if *status == Self::UNAUTHORIZED)
    }

    /// True for a 4xx rejection, i.e. the backend refused the request itself.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ApiError::Http { status, .. } if (400..500).contains(status))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Network { timeout: true, .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }
}

/// Console error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("Backend error: {0}")]
    Backend(#[from] ApiError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

fn backend_response(err: &ApiError) -> Response {
    let (status, error, details, errors) = match err {
        // The session was invalidated; the view is no longer valid.
        e if e.is_unauthorized() => return Redirect::to("/login").into_response(),
        ApiError::Network { timeout: true, .. } => {
            (StatusCode::GATEWAY_TIMEOUT, "backend_timeout", None, Vec::new())
        }
        ApiError::Network { message, .. } => {
            tracing::warn!(error = %message, "Backend unreachable");
            (StatusCode::BAD_GATEWAY, "backend_unreachable", None, Vec::new())
        }
        ApiError::Http { status, .. } => (
            StatusCode::BAD_GATEWAY,
            "backend_error",
            Some(format!("HTTP {}", status)),
            Vec::new(),
        ),
        ApiError::Application { message, errors } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "rejected",
            message.clone(),
            errors.clone(),
        ),
        ApiError::Decode(msg) => {
            tracing::error!(error = %msg, "Malformed backend response");
            (StatusCode::BAD_GATEWAY, "bad_backend_response", None, Vec::new())
        }
        ApiError::InvalidRequest(msg) => {
            tracing::error!(error = %msg, "Failed to build backend request");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None, Vec::new())
        }
    };

    let body = ErrorResponse {
        error: error.to_string(),
        details,
        errors,
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            ConsoleError::Backend(err) | ConsoleError::Session(SessionError::Api(err)) => {
                return backend_response(err);
            }
            ConsoleError::Session(SessionError::AlreadyAuthenticated) => {
                (StatusCode::CONFLICT, "already_authenticated", None)
            }
            ConsoleError::Session(SessionError::NotReady) => {
                (StatusCode::SERVICE_UNAVAILABLE, "session_initializing", None)
            }
            ConsoleError::Session(SessionError::Store(err)) => {
                tracing::error!(error = %err, "Token store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
            }
            ConsoleError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            errors: Vec::new(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, ConsoleError>;

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session guard middleware for protected console views.

use crate::guard::{guard, Route, View};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

/// Login URL that returns the operator to `target` afterwards.
pub fn login_redirect(target: &str) -> String {
    format!("{}?next={}", View::Login.path(), urlencoding::encode(target))
}

/// Middleware that renders protected views only for a logged-in operator.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    // Unknown paths under the protected router are treated like the dashboard.
    let view = View::from_path(request.uri().path()).unwrap_or(View::Dashboard);

    match guard(&state.session.state(), view) {
        Route::Render(view) => {
            state.navigator.navigate(view);
            next.run(request).await
        }
        Route::Redirect(target) => {
            state.navigator.navigate(target);
            let original = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            tracing::debug!(path = %original, "Unauthenticated view request, redirecting");
            Redirect::to(&login_redirect(original)).into_response()
        }
        Route::Pending => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
            response
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Operator login and logout routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{ConsoleError, Result};
use crate::guard::View;
use crate::models::User;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login_status).post(login))
        .route("/logout", post(logout))
}

/// Session status shown on the login view.
#[derive(Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub initializing: bool,
    pub user: Option<User>,
}

async fn login_status(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    Json(SessionStatus {
        authenticated: state.session.is_authenticated(),
        initializing: state.session.is_initializing(),
        user: state.session.current_user(),
    })
}

/// Login form.
#[derive(Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, max = 64))]
    username: String,
    #[validate(length(min = 1, max = 256))]
    password: String,
}

#[derive(Deserialize)]
pub struct LoginParams {
    /// Console path to return to after logging in.
    #[serde(default)]
    next: Option<String>,
}

/// Only same-console paths are accepted as post-login targets.
fn safe_next(next: Option<String>) -> String {
    next.filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or_else(|| View::Dashboard.path().to_string())
}

#[derive(Serialize)]
struct LoginFailed {
    error: &'static str,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LoginParams>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    form.validate()
        .map_err(|e| ConsoleError::BadRequest(e.to_string()))?;

    if !state.session.login(&form.username, &form.password).await? {
        // Generic message; the backend's reason is not shown to the operator.
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(LoginFailed {
                error: "invalid_credentials",
            }),
        )
            .into_response());
    }

    let target = safe_next(params.next);
    if let Some(view) = View::from_path(&target) {
        state.navigator.navigate(view);
    }
    Ok(Redirect::to(&target).into_response())
}

async fn logout(State(state): State<Arc<AppState>>) -> Redirect {
    // Backend notification runs in the background; nothing to wait for here.
    let _notify = state.session.logout();
    state.navigator.redirect_to_login();
    Redirect::to(View::Login.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next_rejects_foreign_targets() {
        assert_eq!(safe_next(None), "/dashboard");
        assert_eq!(safe_next(Some("/users?page=2".to_string())), "/users?page=2");
        assert_eq!(safe_next(Some("//evil.example".to_string())), "/dashboard");
        assert_eq!(
            safe_next(Some("https://evil.example".to_string())),
            "/dashboard"
        );
    }

    #[test]
    fn test_login_form_validation() {
        let form = LoginForm {
            username: String::new(),
            password: "secret".to_string(),
        };
        assert!(form.validate().is_err());

        let form = LoginForm {
            username: "admin".to_string(),
            password: "secret".to_string(),
        };
        assert!(form.validate().is_ok());
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Console views and the route guard deciding whether they render.

use crate::services::session::AuthState;

/// A top-level console view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    Users,
    Subscriptions,
    Payments,
    Settings,
    Broadcasts,
    Login,
}

impl View {
    pub const ALL: [View; 7] = [
        View::Dashboard,
        View::Users,
        View::Subscriptions,
        View::Payments,
        View::Settings,
        View::Broadcasts,
        View::Login,
    ];

    /// Canonical path of the view.
    pub fn path(self) -> &'static str {
        match self {
            View::Dashboard => "/dashboard",
            View::Users => "/users",
            View::Subscriptions => "/subscriptions",
            View::Payments => "/payments",
            View::Settings => "/settings",
            View::Broadcasts => "/broadcasts",
            View::Login => "/login",
        }
    }

    /// Resolve a request path to the view owning it.
    ///
    /// `/` is the dashboard; nested paths (`/users/42/block`) belong to the
    /// view named by their first segment.
    pub fn from_path(path: &str) -> Option<View> {
        let first = path.trim_start_matches('/').split('/').next().unwrap_or("");
        match first {
            "" | "dashboard" => Some(View::Dashboard),
            "users" => Some(View::Users),
            "subscriptions" => Some(View::Subscriptions),
            "payments" => Some(View::Payments),
            "settings" => Some(View::Settings),
            "broadcasts" => Some(View::Broadcasts),
            "login" => Some(View::Login),
            _ => None,
        }
    }

    /// Whether the view requires an authenticated operator.
    pub fn is_protected(self) -> bool {
        self != View::Login
    }
}

/// Outcome of guarding a view request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Render the requested view.
    Render(View),
    /// Send the operator elsewhere (always the login view).
    Redirect(View),
    /// The session is still initializing; render nothing protected yet.
    Pending,
}

/// Decide whether `requested` may render for the given session state.
pub fn guard(state: &AuthState, requested: View) -> Route {
    if !requested.is_protected() {
        return Route::Render(requested);
    }
    match state {
        AuthState::Authenticated(_) => Route::Render(requested),
        AuthState::Unauthenticated => Route::Redirect(View::Login),
        AuthState::Initializing => Route::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn operator() -> User {
        User {
            id: 1,
            username: "admin".to_string(),
            telegram_id: 123456789,
            is_admin: true,
        }
    }

    #[test]
    fn test_unauthenticated_redirects_protected_views() {
        for view in View::ALL.into_iter().filter(|v| v.is_protected()) {
            assert_eq!(
                guard(&AuthState::Unauthenticated, view),
                Route::Redirect(View::Login),
                "{:?} should redirect",
                view
            );
        }
    }

    #[test]
    fn test_authenticated_renders_requested_view() {
        let state = AuthState::Authenticated(operator());
        for view in View::ALL {
            assert_eq!(guard(&state, view), Route::Render(view));
        }
    }

    #[test]
    fn test_initializing_holds_protected_views() {
        assert_eq!(guard(&AuthState::Initializing, View::Users), Route::Pending);
        assert_eq!(
            guard(&AuthState::Initializing, View::Login),
            Route::Render(View::Login)
        );
    }

    #[test]
    fn test_login_always_renders() {
        assert_eq!(
            guard(&AuthState::Unauthenticated, View::Login),
            Route::Render(View::Login)
        );
    }

    #[test]
    fn test_view_from_path() {
        assert_eq!(View::from_path("/"), Some(View::Dashboard));
        assert_eq!(View::from_path("/dashboard"), Some(View::Dashboard));
        assert_eq!(View::from_path("/users/42/block"), Some(View::Users));
        assert_eq!(View::from_path("/settings/testing-mode"), Some(View::Settings));
        assert_eq!(View::from_path("/login"), Some(View::Login));
        assert_eq!(View::from_path("/nope"), None);

        for view in View::ALL {
            assert_eq!(View::from_path(view.path()), Some(view));
        }
    }
}

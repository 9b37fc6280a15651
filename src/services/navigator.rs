// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tracks which view the operator is on.

use std::sync::{Mutex, PoisonError};

use crate::guard::View;

/// Current-view slot for the single operator.
#[derive(Debug)]
pub struct Navigator {
    current: Mutex<View>,
}

impl Navigator {
    /// Start on the login view.
    pub fn new() -> Self {
        Self {
            current: Mutex::new(View::Login),
        }
    }

    pub fn current(&self) -> View {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move to `view`, returning the previous one.
    pub fn navigate(&self, view: View) -> View {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, view)
    }

    /// Force navigation to the login view.
    ///
    /// Returns false when already there, so repeated triggers are no-ops.
    pub fn redirect_to_login(&self) -> bool {
        let previous = self.navigate(View::Login);
        if previous == View::Login {
            return false;
        }
        tracing::info!(from = ?previous, "Redirecting operator to login");
        true
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request payloads for the admin endpoints.
//!
//! Domain entities (users, subscriptions, payments, broadcasts) are passed
//! through as opaque JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Aggregate counters from `GET /admin/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub users: Value,
    #[serde(default)]
    pub subscriptions: Value,
    #[serde(default)]
    pub payments: Value,
    #[serde(default)]
    pub system: Value,
}

/// Ordered query parameters for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams(Vec<(String, String)>);

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.0.push((key.into(), value.to_string()));
        self
    }

    pub fn page(self, page: u32) -> Self {
        self.with("page", page)
    }

    pub fn per_page(self, per_page: u32) -> Self {
        self.with("per_page", per_page)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ListParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Body of `POST /admin/users/{id}/block`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BlockRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Body of `POST /admin/subscriptions/{id}/extend`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExtendRequest {
    #[validate(range(min = 1, max = 3650))]
    pub days: u32,
}

/// Body of `POST /admin/toggle-testing-mode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestingModeRequest {
    pub testing_mode: bool,
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use vpn_admin_console::config::Config;
use vpn_admin_console::models::User;
use vpn_admin_console::services::{MemoryPersistence, TokenStore};
use vpn_admin_console::AppState;
use wiremock::{MockServer, ResponseTemplate};

/// Config pointing at a stub backend.
#[allow(dead_code)]
pub fn config_for(server: &MockServer) -> Config {
    Config {
        api_base_url: format!("{}/api/v1", server.uri()),
        request_timeout: Duration::from_secs(2),
        ..Config::test_default()
    }
}

/// Build the application state over in-memory token persistence.
/// Returns the state and the persistence so tests can inspect writes.
#[allow(dead_code)]
pub fn create_test_state(
    server: &MockServer,
    token: Option<&str>,
) -> (Arc<AppState>, Arc<MemoryPersistence>) {
    create_test_state_with(config_for(server), token)
}

#[allow(dead_code)]
pub fn create_test_state_with(
    config: Config,
    token: Option<&str>,
) -> (Arc<AppState>, Arc<MemoryPersistence>) {
    let persistence = Arc::new(match token {
        Some(token) => MemoryPersistence::with_token(token),
        None => MemoryPersistence::default(),
    });
    let store = TokenStore::open(persistence.clone()).expect("memory store should open");
    let state = AppState::new(config, store).expect("client should build");
    (Arc::new(state), persistence)
}

/// The operator identity used across tests.
#[allow(dead_code)]
pub fn operator() -> User {
    User {
        id: 7,
        username: "admin".to_string(),
        telegram_id: 123456789,
        is_admin: true,
    }
}

/// 200 response with a successful envelope.
#[allow(dead_code)]
pub fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

/// 200 response with a failed envelope.
#[allow(dead_code)]
pub fn rejected(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": false,
        "data": null,
        "message": message,
        "errors": [message]
    }))
}

/// Plain 401 rejection.
#[allow(dead_code)]
pub fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "success": false,
        "data": null,
        "message": "Not authenticated"
    }))
}

/// Authorization header values of every request the stub received.
#[allow(dead_code)]
pub async fn authorization_headers(server: &MockServer) -> Vec<Option<String>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| {
            request
                .headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .collect()
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend client tests: auth header, failure taxonomy, 401 handling and
//! the middleware chain.

use reqwest::Method;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vpn_admin_console::error::ApiError;
use vpn_admin_console::models::{Envelope, ListParams, User};
use vpn_admin_console::services::{
    ApiClient, Call, Exchange, RequestLayer, ResponseLayer, SessionEvent, TokenStore,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{authorization_headers, create_test_state, ok, rejected, unauthorized};

#[tokio::test]
async fn test_bearer_attached_when_token_stored() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/settings"))
        .respond_with(ok(json!({"testing_mode": false})))
        .mount(&server)
        .await;

    let (state, _) = create_test_state(&server, Some("t1"));
    let settings = state.client.settings().await.unwrap();

    assert_eq!(settings, json!({"testing_mode": false}));
    assert_eq!(
        authorization_headers(&server).await,
        vec![Some("Bearer t1".to_string())]
    );
}

#[tokio::test]
async fn test_no_bearer_without_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/settings"))
        .respond_with(ok(json!({})))
        .mount(&server)
        .await;

    let (state, _) = create_test_state(&server, None);
    state.client.settings().await.unwrap();

    assert_eq!(authorization_headers(&server).await, vec![None]);
}

#[tokio::test]
async fn test_request_returns_failed_envelope_as_is() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/stats"))
        .respond_with(rejected("Stats unavailable"))
        .mount(&server)
        .await;

    let (state, _) = create_test_state(&server, Some("t1"));

    let envelope: Envelope<Value> = state
        .client
        .request(Method::GET, "/admin/stats", None, None)
        .await
        .unwrap();
    assert!(!envelope.success);
    assert_eq!(envelope.message.as_deref(), Some("Stats unavailable"));

    // The typed wrapper turns it into an application error.
    match state.client.dashboard_stats().await {
        Err(ApiError::Application { message, errors }) => {
            assert_eq!(message.as_deref(), Some("Stats unavailable"));
            assert_eq!(errors, vec!["Stats unavailable".to_string()]);
        }
        other => panic!("expected application error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_envelope_payload_is_not_decoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "data": {},
            "message": "Session expired"
        })))
        .mount(&server)
        .await;

    let (state, _) = create_test_state(&server, Some("t1"));

    // `{}` is not a valid user, but a failed envelope's data is never parsed.
    let envelope: Envelope<User> = state
        .client
        .request(Method::GET, "/auth/me", None, None)
        .await
        .unwrap();
    assert!(!envelope.success);
    assert_eq!(envelope.data, None);
    assert_eq!(envelope.message.as_deref(), Some("Session expired"));

    assert!(matches!(
        state.client.me().await,
        Err(ApiError::Application { .. })
    ));
}

#[tokio::test]
async fn test_non_2xx_is_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/users/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such user"))
        .mount(&server)
        .await;

    let (state, _) = create_test_state(&server, Some("t1"));

    match state.client.user(404).await {
        Err(ApiError::Http { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such user");
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
    // Only 401 touches the session.
    assert!(state.client.token_store().is_present());
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/broadcasts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let (state, _) = create_test_state(&server, Some("t1"));
    let result = state.client.broadcasts().await;

    assert!(matches!(result, Err(ApiError::Decode(_))), "{:?}", result);
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/stats"))
        .respond_with(ok(json!({})).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let config = vpn_admin_console::config::Config {
        request_timeout: Duration::from_millis(100),
        ..common::config_for(&server)
    };
    let (state, _) = common::create_test_state_with(config, Some("t1"));

    let err = state.client.dashboard_stats().await.unwrap_err();
    assert!(err.is_timeout(), "{:?}", err);
    assert!(matches!(err, ApiError::Network { timeout: true, .. }));
}

#[tokio::test]
async fn test_unauthorized_clears_token_and_notifies() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/payments"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;

    let (state, persistence) = create_test_state(&server, Some("t1"));
    let mut events = state.events.subscribe();

    let err = state.client.payments(ListParams::new()).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!state.client.token_store().is_present());
    assert_eq!(persistence.removals(), 1);
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::Unauthorized {
            path: "/admin/payments".to_string()
        }
    );
}

#[tokio::test]
async fn test_concurrent_unauthorized_clears_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/users"))
        .respond_with(unauthorized().set_delay(Duration::from_millis(100)))
        .expect(2)
        .mount(&server)
        .await;

    let (state, persistence) = create_test_state(&server, Some("t1"));
    let mut events = state.events.subscribe();

    let (first, second) = tokio::join!(
        state.client.users(ListParams::new()),
        state.client.users(ListParams::new()),
    );

    assert!(first.unwrap_err().is_unauthorized());
    assert!(second.unwrap_err().is_unauthorized());
    assert_eq!(persistence.removals(), 1);
    assert!(events.try_recv().is_ok());
    assert!(events.try_recv().is_err(), "only one invalidation expected");
}

#[tokio::test]
async fn test_late_unauthorized_keeps_newer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/settings"))
        .respond_with(unauthorized().set_delay(Duration::from_millis(200)))
        .mount(&server)
        .await;

    let (state, _) = create_test_state(&server, Some("old"));
    let mut events = state.events.subscribe();

    let pending = {
        let state = state.clone();
        tokio::spawn(async move { state.client.settings().await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    state
        .client
        .token_store()
        .replace("new".to_string())
        .unwrap();

    assert!(pending.await.unwrap().unwrap_err().is_unauthorized());
    assert_eq!(state.client.token_store().get().as_deref(), Some("new"));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_explicit_credential_overrides_store() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .and(header("authorization", "Bearer explicit"))
        .respond_with(ok(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let (state, _) = create_test_state(&server, Some("stored"));
    state.client.logout("explicit").await.unwrap();
}

#[tokio::test]
async fn test_list_params_forwarded_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/subscriptions"))
        .and(query_param("status", "active"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "50"))
        .respond_with(ok(json!({"items": [], "total": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let (state, _) = create_test_state(&server, Some("t1"));
    let params = ListParams::new()
        .with("status", "active")
        .page(2)
        .per_page(50);
    let listing = state.client.subscriptions(params).await.unwrap();

    assert_eq!(listing["total"], 0);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("status=active&page=2&per_page=50"));
}

#[tokio::test]
async fn test_admin_actions_hit_expected_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/admin/users/5/block"))
        .and(body_json(json!({"reason": "spam"})))
        .respond_with(ok(json!({"id": 5, "is_blocked": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/admin/users/5/unblock"))
        .respond_with(ok(json!({"id": 5, "is_blocked": false})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/admin/users/5"))
        .and(body_json(json!({"is_admin": true})))
        .respond_with(ok(json!({"id": 5})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/admin/subscriptions/9/extend"))
        .and(body_json(json!({"days": 30})))
        .respond_with(ok(json!({"id": 9})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/admin/subscriptions/9"))
        .and(body_json(json!({"auto_renew": false})))
        .respond_with(ok(json!({"id": 9})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/admin/subscriptions/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/admin/payments/3/refund"))
        .and(body_json(json!({"amount": 199, "reason": "duplicate"})))
        .respond_with(ok(json!({"id": 3, "status": "refunded"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/admin/toggle-testing-mode"))
        .and(body_json(json!({"testing_mode": true})))
        .respond_with(ok(json!({"testing_mode": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/admin/broadcast"))
        .and(body_json(json!({"message": "maintenance tonight"})))
        .respond_with(ok(json!({"id": 11})))
        .expect(1)
        .mount(&server)
        .await;

    let (state, _) = create_test_state(&server, Some("t1"));
    let client = &state.client;

    assert_eq!(client.block_user(5, "spam").await.unwrap()["is_blocked"], true);
    assert_eq!(client.unblock_user(5).await.unwrap()["is_blocked"], false);
    client
        .update_user(5, &json!({"is_admin": true}))
        .await
        .unwrap();
    client.extend_subscription(9, 30).await.unwrap();
    client
        .update_subscription(9, &json!({"auto_renew": false}))
        .await
        .unwrap();
    assert_eq!(client.cancel_subscription(9).await.unwrap(), Value::Null);
    client
        .refund_payment(3, &json!({"amount": 199, "reason": "duplicate"}))
        .await
        .unwrap();
    client.toggle_testing_mode(true).await.unwrap();
    client
        .create_broadcast(&json!({"message": "maintenance tonight"}))
        .await
        .unwrap();
}

/// Records the order in which layers ran.
struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl RequestLayer for Recorder {
    fn on_request(
        &self,
        exchange: &mut Exchange,
        request: reqwest::Request,
    ) -> Result<reqwest::Request, ApiError> {
        self.log.lock().unwrap().push(format!(
            "{} request {} {} auth={}",
            self.name,
            exchange.method,
            exchange.path,
            exchange.credential.is_some()
        ));
        Ok(request)
    }
}

impl ResponseLayer for Recorder {
    fn on_response(
        &self,
        exchange: &Exchange,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        self.log.lock().unwrap().push(format!(
            "{} response {} {}",
            self.name,
            exchange.path,
            response.status().as_u16()
        ));
        Ok(response)
    }
}

/// Rejects every request before it is sent.
struct Offline;

impl RequestLayer for Offline {
    fn on_request(
        &self,
        _exchange: &mut Exchange,
        _request: reqwest::Request,
    ) -> Result<reqwest::Request, ApiError> {
        Err(ApiError::Network {
            timeout: false,
            message: "offline".to_string(),
        })
    }
}

#[tokio::test]
async fn test_layers_run_in_registration_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/broadcasts/1"))
        .respond_with(ok(json!({"id": 1})))
        .mount(&server)
        .await;

    let log = Arc::new(Mutex::new(Vec::new()));
    let store = Arc::new(TokenStore::in_memory());
    store.replace("t1".to_string()).unwrap();

    let client = ApiClient::builder(&common::config_for(&server), store, Default::default())
        .request_layer(Recorder {
            name: "first",
            log: log.clone(),
        })
        .request_layer(Recorder {
            name: "second",
            log: log.clone(),
        })
        .response_layer(Recorder {
            name: "first",
            log: log.clone(),
        })
        .build()
        .unwrap();

    client.broadcast(1).await.unwrap();

    // Bearer layer ran before the custom ones, so the credential is visible.
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "first request GET /admin/broadcasts/1 auth=true".to_string(),
            "second request GET /admin/broadcasts/1 auth=true".to_string(),
            "first response /admin/broadcasts/1 200".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_request_layer_can_short_circuit() {
    let server = MockServer::start().await;

    let client = ApiClient::builder(
        &common::config_for(&server),
        Arc::new(TokenStore::in_memory()),
        Default::default(),
    )
    .request_layer(Offline)
    .build()
    .unwrap();

    let err = client
        .request_data::<Value>(Call::get("/admin/settings"))
        .await
        .unwrap_err();

    assert!(err.is_network());
    assert!(server.received_requests().await.unwrap().is_empty());
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Protected console views and operator actions.
//!
//! Backend payloads are passed through unchanged. The session guard is
//! applied in routes/mod.rs for all of these routes.

use crate::error::{ConsoleError, Result};
use crate::models::{BlockRequest, DashboardStats, ExtendRequest, ListParams, TestingModeRequest};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(dashboard))
        .route("/dashboard", get(dashboard))
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user).put(update_user))
        .route("/users/{id}/block", post(block_user))
        .route("/users/{id}/unblock", post(unblock_user))
        .route("/subscriptions", get(list_subscriptions))
        .route(
            "/subscriptions/{id}",
            get(get_subscription)
                .patch(update_subscription)
                .delete(cancel_subscription),
        )
        .route("/subscriptions/{id}/extend", post(extend_subscription))
        .route("/payments", get(list_payments))
        .route("/payments/{id}", get(get_payment))
        .route("/payments/{id}/refund", post(refund_payment))
        .route("/settings", get(get_settings).post(update_setting))
        .route("/settings/testing-mode", post(toggle_testing_mode))
        .route("/broadcasts", get(list_broadcasts).post(create_broadcast))
        .route("/broadcasts/{id}", get(get_broadcast))
}

type ListQuery = Query<Vec<(String, String)>>;

fn validated<T: Validate>(body: T) -> Result<T> {
    body.validate()
        .map_err(|e| ConsoleError::BadRequest(e.to_string()))?;
    Ok(body)
}

// ─── Dashboard ───────────────────────────────────────────────

async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Json<DashboardStats>> {
    Ok(Json(state.client.dashboard_stats().await?))
}

// ─── Users ───────────────────────────────────────────────────

async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): ListQuery,
) -> Result<Json<Value>> {
    let params: ListParams = params.into_iter().collect();
    Ok(Json(state.client.users(params).await?))
}

async fn get_user(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Result<Json<Value>> {
    Ok(Json(state.client.user(id).await?))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    Ok(Json(state.client.update_user(id, &body).await?))
}

async fn block_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<BlockRequest>,
) -> Result<Json<Value>> {
    let body = validated(body)?;
    tracing::info!(user_id = id, reason = %body.reason, "Blocking user");
    Ok(Json(state.client.block_user(id, &body.reason).await?))
}

async fn unblock_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    tracing::info!(user_id = id, "Unblocking user");
    Ok(Json(state.client.unblock_user(id).await?))
}

// ─── Subscriptions ───────────────────────────────────────────

async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    Query(params): ListQuery,
) -> Result<Json<Value>> {
    let params: ListParams = params.into_iter().collect();
    Ok(Json(state.client.subscriptions(params).await?))
}

async fn get_subscription(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    Ok(Json(state.client.subscription(id).await?))
}

async fn update_subscription(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    Ok(Json(state.client.update_subscription(id, &body).await?))
}

async fn cancel_subscription(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    tracing::info!(subscription_id = id, "Cancelling subscription");
    Ok(Json(state.client.cancel_subscription(id).await?))
}

async fn extend_subscription(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<ExtendRequest>,
) -> Result<Json<Value>> {
    let body = validated(body)?;
    tracing::info!(subscription_id = id, days = body.days, "Extending subscription");
    Ok(Json(state.client.extend_subscription(id, body.days).await?))
}

// ─── Payments ────────────────────────────────────────────────

async fn list_payments(
    State(state): State<Arc<AppState>>,
    Query(params): ListQuery,
) -> Result<Json<Value>> {
    let params: ListParams = params.into_iter().collect();
    Ok(Json(state.client.payments(params).await?))
}

async fn get_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    Ok(Json(state.client.payment(id).await?))
}

async fn refund_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    tracing::info!(payment_id = id, "Refunding payment");
    Ok(Json(state.client.refund_payment(id, &body).await?))
}

// ─── Settings ────────────────────────────────────────────────

async fn get_settings(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    Ok(Json(state.client.settings().await?))
}

async fn update_setting(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    Ok(Json(state.client.update_setting(&body).await?))
}

async fn toggle_testing_mode(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TestingModeRequest>,
) -> Result<Json<Value>> {
    tracing::info!(testing_mode = body.testing_mode, "Toggling testing mode");
    Ok(Json(
        state.client.toggle_testing_mode(body.testing_mode).await?,
    ))
}

// ─── Broadcasts ──────────────────────────────────────────────

async fn list_broadcasts(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    Ok(Json(state.client.broadcasts().await?))
}

async fn get_broadcast(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    Ok(Json(state.client.broadcast(id).await?))
}

async fn create_broadcast(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    tracing::info!("Creating broadcast");
    Ok(Json(state.client.create_broadcast(&body).await?))
}

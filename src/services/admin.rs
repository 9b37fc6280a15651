// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed wrappers for the admin backend endpoints.

use reqwest::Method;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{
    BlockRequest, DashboardStats, Envelope, ExtendRequest, ListParams, LoginRequest,
    LoginResponse, TestingModeRequest, User,
};
use crate::services::backend::{ApiClient, Call};

impl ApiClient {
    // ─── Authentication ──────────────────────────────────────────────────────

    /// `POST /auth/login`. The envelope is returned unwrapped so the caller
    /// can tell bad credentials apart from transport failures.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Envelope<LoginResponse>, ApiError> {
        let call = Call::post("/auth/login").json(&LoginRequest { username, password })?;
        self.send(call).await
    }

    /// `POST /auth/logout` with an explicit credential (the stored token is
    /// usually gone by the time the backend is notified).
    pub async fn logout(&self, credential: &str) -> Result<(), ApiError> {
        self.send::<Value>(Call::post("/auth/logout").bearer(credential))
            .await?
            .into_ack()
    }

    /// `GET /auth/me`: identity behind the stored token.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.request_data(Call::get("/auth/me")).await
    }

    // ─── Dashboard ───────────────────────────────────────────────────────────

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.request_data(Call::get("/admin/stats")).await
    }

    // ─── Users ───────────────────────────────────────────────────────────────

    pub async fn users(&self, params: ListParams) -> Result<Value, ApiError> {
        self.value(Call::get("/admin/users").query(params)).await
    }

    pub async fn user(&self, id: i64) -> Result<Value, ApiError> {
        self.value(Call::get(format!("/admin/users/{}", id))).await
    }

    pub async fn update_user(&self, id: i64, data: &Value) -> Result<Value, ApiError> {
        let call = Call::new(Method::PUT, format!("/admin/users/{}", id)).json(data)?;
        self.value(call).await
    }

    pub async fn block_user(&self, id: i64, reason: &str) -> Result<Value, ApiError> {
        let body = BlockRequest {
            reason: reason.to_string(),
        };
        let call = Call::post(format!("/admin/users/{}/block", id)).json(&body)?;
        self.value(call).await
    }

    pub async fn unblock_user(&self, id: i64) -> Result<Value, ApiError> {
        self.value(Call::post(format!("/admin/users/{}/unblock", id)))
            .await
    }

    // ─── Subscriptions ───────────────────────────────────────────────────────

    pub async fn subscriptions(&self, params: ListParams) -> Result<Value, ApiError> {
        self.value(Call::get("/admin/subscriptions").query(params))
            .await
    }

    pub async fn subscription(&self, id: i64) -> Result<Value, ApiError> {
        self.value(Call::get(format!("/admin/subscriptions/{}", id)))
            .await
    }

    pub async fn update_subscription(&self, id: i64, data: &Value) -> Result<Value, ApiError> {
        let call = Call::new(Method::PATCH, format!("/admin/subscriptions/{}", id)).json(data)?;
        self.value(call).await
    }

    pub async fn cancel_subscription(&self, id: i64) -> Result<Value, ApiError> {
        self.value(Call::new(
            Method::DELETE,
            format!("/admin/subscriptions/{}", id),
        ))
        .await
    }

    pub async fn extend_subscription(&self, id: i64, days: u32) -> Result<Value, ApiError> {
        let call = Call::post(format!("/admin/subscriptions/{}/extend", id))
            .json(&ExtendRequest { days })?;
        self.value(call).await
    }

    // ─── Payments ────────────────────────────────────────────────────────────

    pub async fn payments(&self, params: ListParams) -> Result<Value, ApiError> {
        self.value(Call::get("/admin/payments").query(params)).await
    }

    pub async fn payment(&self, id: i64) -> Result<Value, ApiError> {
        self.value(Call::get(format!("/admin/payments/{}", id)))
            .await
    }

    pub async fn refund_payment(&self, id: i64, data: &Value) -> Result<Value, ApiError> {
        let call = Call::post(format!("/admin/payments/{}/refund", id)).json(data)?;
        self.value(call).await
    }

    // ─── Settings ────────────────────────────────────────────────────────────

    pub async fn settings(&self) -> Result<Value, ApiError> {
        self.value(Call::get("/admin/settings")).await
    }

    pub async fn update_setting(&self, data: &Value) -> Result<Value, ApiError> {
        self.value(Call::post("/admin/settings").json(data)?).await
    }

    pub async fn toggle_testing_mode(&self, testing_mode: bool) -> Result<Value, ApiError> {
        let call =
            Call::post("/admin/toggle-testing-mode").json(&TestingModeRequest { testing_mode })?;
        self.value(call).await
    }

    // ─── Broadcasts ──────────────────────────────────────────────────────────

    pub async fn create_broadcast(&self, data: &Value) -> Result<Value, ApiError> {
        self.value(Call::post("/admin/broadcast").json(data)?).await
    }

    pub async fn broadcasts(&self) -> Result<Value, ApiError> {
        self.value(Call::get("/admin/broadcasts")).await
    }

    pub async fn broadcast(&self, id: i64) -> Result<Value, ApiError> {
        self.value(Call::get(format!("/admin/broadcasts/{}", id)))
            .await
    }

    /// Send a call whose payload is passed through as opaque JSON.
    async fn value(&self, call: Call) -> Result<Value, ApiError> {
        self.send::<Value>(call).await?.into_value()
    }
}

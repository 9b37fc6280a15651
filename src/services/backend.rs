// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin backend API client.
//!
//! Every backend call goes through [`ApiClient::send`], which runs an
//! ordered middleware chain around the HTTP exchange:
//! - request layers see the outgoing request (bearer auth by default)
//! - response layers see the raw response before status handling
//!   (401 session invalidation by default)
//!
//! Layers run in registration order and may short-circuit with an error.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{Envelope, ListParams};
use crate::services::events::SessionEvents;
use crate::services::layers::{BearerAuthLayer, RejectedTokenLayer};
use crate::services::token_store::TokenStore;

/// Per-call context shared by the middleware chain.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub method: Method,
    pub path: String,
    /// Credential attached to the outgoing request, if any.
    pub credential: Option<String>,
}

/// Transform applied to every outgoing request.
pub trait RequestLayer: Send + Sync {
    fn on_request(
        &self,
        exchange: &mut Exchange,
        request: reqwest::Request,
    ) -> Result<reqwest::Request, ApiError>;
}

/// Transform applied to every response, before status handling.
pub trait ResponseLayer: Send + Sync {
    fn on_response(
        &self,
        exchange: &Exchange,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError>;
}

/// Description of a single backend call.
#[derive(Debug, Clone)]
pub struct Call {
    method: Method,
    path: String,
    query: ListParams,
    body: Option<Value>,
    credential: Option<String>,
}

impl Call {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: ListParams::default(),
            body: None,
            credential: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn query(mut self, params: ListParams) -> Self {
        self.query = params;
        self
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value =
            serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Send with this credential instead of the stored token.
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.credential = Some(token.into());
        self
    }
}

#[derive(Default)]
struct Pipeline {
    request: Vec<Arc<dyn RequestLayer>>,
    response: Vec<Arc<dyn ResponseLayer>>,
}

/// Admin backend API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    pipeline: Arc<Pipeline>,
    store: Arc<TokenStore>,
    events: SessionEvents,
}

impl ApiClient {
    /// Create a client with the default middleware chain.
    pub fn new(
        config: &Config,
        store: Arc<TokenStore>,
        events: SessionEvents,
    ) -> Result<Self, ApiError> {
        Self::builder(config, store, events).build()
    }

    /// Start from the default middleware chain and add layers.
    pub fn builder(
        config: &Config,
        store: Arc<TokenStore>,
        events: SessionEvents,
    ) -> ApiClientBuilder {
        let mut pipeline = Pipeline::default();
        pipeline
            .request
            .push(Arc::new(BearerAuthLayer::new(store.clone())));
        pipeline.response.push(Arc::new(RejectedTokenLayer::new(
            store.clone(),
            events.clone(),
        )));

        ApiClientBuilder {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
            pipeline,
            store,
            events,
        }
    }

    /// Token store consulted by the bearer layer.
    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Issue a request and decode the envelope.
    ///
    /// `success: false` envelopes are returned as-is; use
    /// [`Envelope::into_result`] to turn them into errors.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: Option<ListParams>,
    ) -> Result<Envelope<T>, ApiError> {
        let mut call = Call::new(method, path);
        call.body = body;
        if let Some(query) = query {
            call = call.query(query);
        }
        self.send(call).await
    }

    /// Issue a request and unwrap the envelope payload.
    pub async fn request_data<T: DeserializeOwned>(&self, call: Call) -> Result<T, ApiError> {
        self.send(call).await?.into_result()
    }

    /// Run a call through the middleware chain.
    pub async fn send<T: DeserializeOwned>(&self, call: Call) -> Result<Envelope<T>, ApiError> {
        let url = format!("{}{}", self.base_url, call.path);

        let mut builder = self.http.request(call.method.clone(), &url);
        if !call.query.is_empty() {
            builder = builder.query(call.query.pairs());
        }
        if let Some(body) = &call.body {
            builder = builder.json(body);
        }
        let mut request = builder
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        let mut exchange = Exchange {
            method: call.method,
            path: call.path,
            credential: call.credential,
        };

        for layer in &self.pipeline.request {
            request = layer.on_request(&mut exchange, request)?;
        }

        let mut response = self.http.execute(request).await.map_err(|e| {
            let err = ApiError::from_transport(e);
            tracing::warn!(
                method = %exchange.method,
                path = %exchange.path,
                error = %err,
                "Backend request failed"
            );
            err
        })?;

        for layer in &self.pipeline.response {
            response = layer.on_response(&exchange, response)?;
        }

        let status = response.status();
        tracing::debug!(
            method = %exchange.method,
            path = %exchange.path,
            status = status.as_u16(),
            "Backend response"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let raw: Envelope<Value> = response.json().await.map_err(ApiError::from_transport)?;
        raw.decode()
    }
}

/// Builder for an [`ApiClient`] with extra middleware.
pub struct ApiClientBuilder {
    base_url: String,
    timeout: Duration,
    pipeline: Pipeline,
    store: Arc<TokenStore>,
    events: SessionEvents,
}

impl ApiClientBuilder {
    /// Append a request layer after the existing ones.
    pub fn request_layer(mut self, layer: impl RequestLayer + 'static) -> Self {
        self.pipeline.request.push(Arc::new(layer));
        self
    }

    /// Append a response layer after the existing ones.
    pub fn response_layer(mut self, layer: impl ResponseLayer + 'static) -> Self {
        self.pipeline.response.push(Arc::new(layer));
        self
    }

    pub fn build(self) -> Result<ApiClient, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("HTTP client setup failed: {}", e)))?;

        Ok(ApiClient {
            http,
            base_url: self.base_url,
            pipeline: Arc::new(self.pipeline),
            store: self.store,
            events: self.events,
        })
    }
}

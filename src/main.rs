// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! VPN Admin Console
//!
//! Local operator console for the VPN service's admin backend. Restores the
//! operator session from the persisted token, then serves the guarded views.

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vpn_admin_console::{config::Config, services::TokenStore, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        api = %config.api_base_url,
        timeout_secs = config.request_timeout.as_secs(),
        "Starting VPN admin console"
    );

    let store = TokenStore::file(config.token_path()).with_context(|| {
        format!(
            "Failed to open token store at {}",
            config.token_path().display()
        )
    })?;

    let state = Arc::new(AppState::new(config.clone(), store).context("Failed to build API client")?);
    let _watcher = state.watch_unauthorized();

    // The guard must not decide before the stored token has been checked.
    let session = state.session.initialize().await;
    tracing::info!(state = ?session, "Session initialized");

    let app = vpn_admin_console::routes::create_router(state);

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Console listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vpn_admin_console=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}

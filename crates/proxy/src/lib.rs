// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Passkeepd: server-side auth proxy for the web console.
//!
//! Shields the raw backend auth endpoints from the browser, owns the
//! HTTP-only token cookies, and carries a coarse cookie-presence gate that
//! redirects unauthenticated page requests to `/login`. The fine-grained
//! session check lives client-side in the `passkeep` crate; the two layers
//! are intentionally independent.

pub mod config;
pub mod error;
pub mod state;
pub mod transport;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::state::ProxyState;
use crate::transport::build_router;

/// Run the proxy until shutdown (ctrl-c).
pub async fn run(config: ProxyConfig) -> anyhow::Result<()> {
    passkeep::http::ensure_crypto_provider();

    let addr = format!("{}:{}", config.host, config.port);
    let backend_url = config.backend_url.clone();
    let state = Arc::new(ProxyState::new(config));
    let router = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(backend = %backend_url, "passkeepd listening on {addr}");
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}

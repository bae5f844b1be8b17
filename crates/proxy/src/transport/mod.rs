// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport for the auth proxy.

pub mod auth;
pub mod cookies;
pub mod guard;

use std::sync::Arc;

use axum::middleware;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::ProxyState;

/// Embedded console placeholder page (stands in for the web app build).
const CONSOLE_HTML: &str = include_str!("../web/console.html");
/// Embedded login page.
const LOGIN_HTML: &str = include_str!("../web/login.html");

/// Build the axum `Router` with all proxy routes.
pub fn build_router(state: Arc<ProxyState>) -> Router {
    Router::new()
        // Pages (the cookie-presence gate applies to these)
        .route("/", get(|| async { Html(CONSOLE_HTML) }))
        .route("/login", get(|| async { Html(LOGIN_HTML) }))
        // Auth API
        .route("/api/auth/send", post(auth::send))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // Middleware
        .layer(middleware::from_fn(guard::guard_layer))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

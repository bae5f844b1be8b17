// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cookie-presence gate for page routes.
//!
//! This is a coarse first line only: it checks that an access cookie exists,
//! not that it is valid. Expired or revoked tokens are caught by the API
//! calls behind the page.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use passkeep::guard::LOGIN_PATH;
use passkeep::refresh::ACCESS_COOKIE;

/// Paths the gate never touches.
fn is_exempt(path: &str) -> bool {
    path == LOGIN_PATH
        || path.starts_with("/api/")
        || path.starts_with("/assets/")
        || path == "/favicon.ico"
}

/// Redirect page requests without an access cookie to the login page.
pub async fn guard_layer(req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if is_exempt(path) {
        return next.run(req).await;
    }

    let jar = CookieJar::from_headers(req.headers());
    if jar.get(ACCESS_COOKIE).is_none() {
        debug!(path, "no access cookie, redirecting to login");
        return Redirect::temporary(LOGIN_PATH).into_response();
    }
    next.run(req).await
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;

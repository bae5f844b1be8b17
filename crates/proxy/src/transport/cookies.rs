// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token cookie construction.
//!
//! All token cookies are HTTP-only, SameSite=Lax, root-scoped. `Secure` is
//! driven by config so local development over plain HTTP keeps working.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use passkeep::refresh::{ACCESS_COOKIE, REFRESH_COOKIE};

/// Fixed refresh-token cookie lifetime: 7 days.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Access-token cookie, valid for the token's own `expires_in`.
pub fn access_cookie(token: &str, expires_in: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((ACCESS_COOKIE, token.to_owned()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(expires_in))
        .build()
}

/// Refresh-token cookie with the fixed 7-day lifetime.
pub fn refresh_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token.to_owned()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(REFRESH_TOKEN_TTL_SECS))
        .build()
}

/// Removal cookie for either token.
pub fn clear_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").max_age(Duration::ZERO).build()
}

#[cfg(test)]
#[path = "cookies_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The refresh operation: exchange the refresh token for a new pair.
//!
//! The exchange goes through the `passkeepd` proxy, which holds both tokens
//! in HTTP-only cookies and talks to the raw backend server-side. Cookie
//! rewrites arrive as `Set-Cookie` on the success response and land in the
//! shared jar; on failure no cookie is touched.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RefreshError;
use crate::http::ProxyHttp;
use crate::types::{ApiResponse, TokenPayload};

/// Cookie holding the short-lived access token.
pub const ACCESS_COOKIE: &str = "access_token";
/// Cookie holding the long-lived refresh token.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Performs one token refresh attempt.
///
/// Trait seam so the scheduler can be driven by a mock in tests. Callers
/// only consult the schedule fields of the returned payload; the rotated
/// token strings also land in the cookie jar via `Set-Cookie`.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self) -> Result<TokenPayload, RefreshError>;
}

/// Refresher that calls the proxy's `/api/auth/refresh` endpoint.
pub struct HttpRefresher {
    http: Arc<ProxyHttp>,
}

impl HttpRefresher {
    pub fn new(http: Arc<ProxyHttp>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl TokenRefresher for HttpRefresher {
    async fn refresh(&self) -> Result<TokenPayload, RefreshError> {
        // Fail fast on missing cookies: the request cannot succeed, so skip
        // the round trip entirely.
        if !self.http.has_cookie(REFRESH_COOKIE) {
            return Err(RefreshError::NoRefreshToken);
        }
        if !self.http.has_cookie(ACCESS_COOKIE) {
            return Err(RefreshError::NoAccessToken);
        }

        let resp = self.http.client().post(self.http.url("/api/auth/refresh")).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let message = match resp.json::<ApiResponse<TokenPayload>>().await {
                Ok(envelope) => envelope.msg,
                Err(_) => String::new(),
            };
            return Err(RefreshError::Rejected { status: status.as_u16(), message });
        }

        let envelope: ApiResponse<TokenPayload> =
            resp.json().await.map_err(|e| RefreshError::Transport(e.to_string()))?;
        if envelope.code != 0 {
            return Err(RefreshError::Rejected { status: status.as_u16(), message: envelope.msg });
        }
        envelope.data.ok_or_else(|| RefreshError::Transport("missing token payload".to_owned()))
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;

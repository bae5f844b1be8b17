// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;
use axum::Json;
use std::fmt;

use passkeep::types::ApiResponse;

/// Error classes the proxy produces itself.
///
/// Backend failures are forwarded verbatim by the handlers and never pass
/// through here; these cover the proxy's own preconditions and transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyError {
    /// `refresh_token` cookie missing on a refresh request.
    NoRefreshToken,
    /// `access_token` cookie missing where the backend contract needs it.
    NoAccessToken,
    Unauthorized,
    /// Backend unreachable or its response was malformed.
    Upstream,
}

impl ProxyError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::NoRefreshToken | Self::NoAccessToken | Self::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            Self::Upstream => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::NoRefreshToken => "no refresh token",
            Self::NoAccessToken => "no access token",
            Self::Unauthorized => "unauthorized",
            Self::Upstream => "backend unavailable",
        }
    }

    /// Envelope response with this error's status and the default message.
    pub fn to_response(&self) -> (StatusCode, Json<ApiResponse<()>>) {
        let status = self.http_status();
        (status, Json(ApiResponse::err(i64::from(status.as_u16()), self.default_message())))
    }
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_message())
    }
}

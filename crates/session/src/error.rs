// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed failures for the token refresh operation.

use thiserror::Error;

/// Why a refresh attempt failed.
///
/// The scheduler treats every variant the same way (sign out and redirect),
/// but the missing-cookie variants are detected locally so no network round
/// trip is wasted on a request that cannot succeed.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// No `refresh_token` cookie present at fire time.
    #[error("no refresh token")]
    NoRefreshToken,

    /// No `access_token` cookie present at fire time. The backend requires
    /// the (possibly expired) access token as a bearer header alongside the
    /// refresh token.
    #[error("no access token")]
    NoAccessToken,

    /// The proxy or backend rejected the refresh (non-2xx or business error).
    #[error("refresh rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Network failure or malformed response.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for RefreshError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

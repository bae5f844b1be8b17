// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types shared between the session core and the auth proxy.

use serde::{Deserialize, Serialize};

/// Identity snapshot returned by the backend's `me` endpoint.
///
/// Opaque to the session core beyond serialization; the store holds it
/// whole and never inspects individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
}

/// Token pair issued by login or refresh.
///
/// Transient: held only long enough to update the credential store. The raw
/// token strings live in HTTP-only cookies owned by the proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPayload {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
    /// Server's current Unix time at issuance (for clock reconciliation).
    pub server_time: i64,
    /// Absolute access-token expiry, epoch seconds.
    pub access_expires_at: i64,
    /// Absolute refresh-token expiry, epoch seconds.
    pub refresh_expires_at: i64,
}

/// Business envelope used by the backend and mirrored by the proxy.
///
/// `code == 0` means success; anything else carries the failure in `msg`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    // `default = "Option::default"` keeps the derive from demanding
    // `T: Default` just to fill in a missing field.
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { code: 0, msg: "ok".to_owned(), data: Some(data) }
    }

    pub fn err(code: i64, msg: impl Into<String>) -> Self {
        Self { code, msg: msg.into(), data: None }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;

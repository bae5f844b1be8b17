// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Auth collaborator surface: login, logout, current-user fetch.
//!
//! Thin calls through the proxy that feed the credential store. The refresh
//! scheduler picks the rest up reactively once `set_authenticated` records
//! the expiry.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::clock;
use crate::http::ProxyHttp;
use crate::store::CredentialStore;
use crate::types::{ApiResponse, TokenPayload, User};

pub struct AuthClient {
    http: Arc<ProxyHttp>,
    store: Arc<CredentialStore>,
}

impl AuthClient {
    pub fn new(http: Arc<ProxyHttp>, store: Arc<CredentialStore>) -> Self {
        Self { http, store }
    }

    /// Request a one-time SMS code for the given phone number.
    pub async fn send_code(&self, phone: &str) -> anyhow::Result<()> {
        let resp = self
            .http
            .client()
            .post(self.http.url("/api/auth/send"))
            .json(&json!({ "phone": phone }))
            .send()
            .await?;
        unwrap_envelope::<serde_json::Value>(resp).await?;
        Ok(())
    }

    /// Log in with phone + one-time code.
    ///
    /// The proxy sets both token cookies; we then resolve the identity and
    /// record expiry + clock offset, which arms the refresh scheduler.
    pub async fn login(&self, phone: &str, code: &str) -> anyhow::Result<User> {
        let resp = self
            .http
            .client()
            .post(self.http.url("/api/auth/login"))
            .json(&json!({ "phone": phone, "code": code }))
            .send()
            .await?;
        let token: TokenPayload = unwrap_envelope(resp)
            .await?
            .ok_or_else(|| anyhow::anyhow!("login returned no token payload"))?;

        let user = self.fetch_me().await?;
        // Offset first: the scheduler arms off the expiry notification and
        // must already see the corrected clock.
        self.store.set_server_time_offset_sec(clock::compute_offset(
            token.server_time,
            clock::epoch_secs(),
        ))?;
        self.store.set_authenticated(user.clone(), Some(token.access_expires_at))?;
        tracing::info!(user_id = user.id, "logged in");
        Ok(user)
    }

    /// Log out: best-effort server-side invalidation, then clear local state.
    pub async fn logout(&self) -> anyhow::Result<()> {
        let result = self.http.client().post(self.http.url("/api/auth/logout")).send().await;
        match result {
            Ok(resp) => {
                if let Err(e) = unwrap_envelope::<serde_json::Value>(resp).await {
                    tracing::warn!(err = %e, "server-side logout failed");
                }
            }
            Err(e) => tracing::warn!(err = %e, "server-side logout unreachable"),
        }
        // Local sign-out happens regardless.
        self.store.set_unauthenticated()?;
        Ok(())
    }

    /// Fetch the current user through the proxy.
    pub async fn fetch_me(&self) -> anyhow::Result<User> {
        let resp = self.http.client().get(self.http.url("/api/auth/me")).send().await?;
        unwrap_envelope(resp).await?.ok_or_else(|| anyhow::anyhow!("me returned no user"))
    }
}

/// Check HTTP status and the business envelope; return the payload.
async fn unwrap_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> anyhow::Result<Option<T>> {
    let status = resp.status();
    if !status.is_success() {
        let msg = match resp.json::<ApiResponse<serde_json::Value>>().await {
            Ok(envelope) => envelope.msg,
            Err(_) => String::new(),
        };
        anyhow::bail!("request failed ({status}): {msg}");
    }
    let envelope: ApiResponse<T> = resp.json().await?;
    if envelope.code != 0 {
        anyhow::bail!("{} (code {})", envelope.msg, envelope.code);
    }
    Ok(envelope.data)
}

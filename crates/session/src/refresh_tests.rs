// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use super::*;

// Preconditions are checked against the local jar, so these tests make no
// network calls even though the base URL points nowhere.

#[tokio::test]
async fn missing_refresh_cookie_fails_without_network() -> anyhow::Result<()> {
    let http = Arc::new(ProxyHttp::new("http://127.0.0.1:1")?);
    let refresher = HttpRefresher::new(http);
    match refresher.refresh().await {
        Err(RefreshError::NoRefreshToken) => Ok(()),
        other => anyhow::bail!("expected NoRefreshToken, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_access_cookie_fails_without_network() -> anyhow::Result<()> {
    let http = Arc::new(ProxyHttp::new("http://127.0.0.1:1")?);
    http.add_cookie("refresh_token=rt; Path=/");
    let refresher = HttpRefresher::new(http);
    match refresher.refresh().await {
        Err(RefreshError::NoAccessToken) => Ok(()),
        other => anyhow::bail!("expected NoAccessToken, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_proxy_is_a_transport_error() -> anyhow::Result<()> {
    // Port 1 refuses connections; both cookies present so the call is made.
    let http = Arc::new(ProxyHttp::new("http://127.0.0.1:1")?);
    http.add_cookie("refresh_token=rt; Path=/");
    http.add_cookie("access_token=at; Path=/");
    let refresher = HttpRefresher::new(http);
    match refresher.refresh().await {
        Err(RefreshError::Transport(_)) => Ok(()),
        other => anyhow::bail!("expected Transport, got {other:?}"),
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Auth API handlers.
//!
//! Every handler speaks the backend's `{code, msg, data}` envelope to the
//! browser. The tokens the browser later presents live in HTTP-only cookies
//! written here; requests to the backend carry them as headers and bodies.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use passkeep::refresh::{ACCESS_COOKIE, REFRESH_COOKIE};
use passkeep::types::{ApiResponse, TokenPayload, User};

use crate::error::ProxyError;
use crate::state::ProxyState;
use crate::transport::cookies;

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub code: String,
}

/// POST /api/auth/send. Pure pass-through, no cookies involved.
pub async fn send(
    State(state): State<Arc<ProxyState>>,
    Json(body): Json<SendCodeRequest>,
) -> impl IntoResponse {
    let url = state.backend_url("/api/auth/send");
    let resp = match state.http.post(&url).json(&body_json(&body)).send().await {
        Ok(r) => r,
        Err(e) => {
            warn!("send code: backend unreachable: {e}");
            return ProxyError::Upstream.to_response().into_response();
        }
    };
    forward_envelope::<serde_json::Value>(resp).await
}

/// POST /api/auth/login.
///
/// On success the token pair from the backend is written into HTTP-only
/// cookies and the envelope is forwarded through.
pub async fn login(
    State(state): State<Arc<ProxyState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> impl IntoResponse {
    let url = state.backend_url("/api/auth/login");
    let payload = json!({"phone": body.phone, "code": body.code});
    let resp = match state.http.post(&url).json(&payload).send().await {
        Ok(r) => r,
        Err(e) => {
            warn!("login: backend unreachable: {e}");
            return ProxyError::Upstream.to_response().into_response();
        }
    };

    let status = bridge_status(resp.status());
    let envelope: ApiResponse<TokenPayload> = match resp.json().await {
        Ok(env) => env,
        Err(e) => {
            warn!("login: malformed backend response: {e}");
            return ProxyError::Upstream.to_response().into_response();
        }
    };

    if !status.is_success() || envelope.code != 0 {
        let code = if envelope.code != 0 {
            envelope.code
        } else {
            i64::from(status.as_u16())
        };
        let forward = if status.is_success() {
            StatusCode::BAD_REQUEST
        } else {
            status
        };
        return (forward, Json(ApiResponse::<()>::err(code, envelope.msg))).into_response();
    }

    let Some(token) = envelope.data else {
        warn!("login: success envelope without token payload");
        return ProxyError::Upstream.to_response().into_response();
    };

    let secure = state.config.secure_cookies;
    let jar = jar
        .add(cookies::access_cookie(&token.access_token, token.expires_in, secure))
        .add(cookies::refresh_cookie(&token.refresh_token, secure));

    debug!(expires_in = token.expires_in, "login: token pair issued");
    (jar, Json(ApiResponse::ok(token))).into_response()
}

/// POST /api/auth/refresh.
///
/// Requires both token cookies; exchanges the pair at the backend and on
/// success rewrites the access cookie and, when rotated, the refresh cookie.
/// Backend rejections are forwarded verbatim with no cookie writes.
pub async fn refresh(
    State(state): State<Arc<ProxyState>>,
    jar: CookieJar,
) -> impl IntoResponse {
    let Some(refresh_token) = jar.get(REFRESH_COOKIE).map(|c| c.value().to_owned()) else {
        return ProxyError::NoRefreshToken.to_response().into_response();
    };
    let Some(access_token) = jar.get(ACCESS_COOKIE).map(|c| c.value().to_owned()) else {
        return ProxyError::NoAccessToken.to_response().into_response();
    };

    let url = state.backend_url("/api/auth/refresh");
    let resp = match state
        .http
        .post(&url)
        // The possibly-expired access token still identifies the session.
        .bearer_auth(&access_token)
        .json(&json!({"refresh_token": refresh_token}))
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!("refresh: backend unreachable: {e}");
            return ProxyError::Upstream.to_response().into_response();
        }
    };

    let status = bridge_status(resp.status());
    let envelope: ApiResponse<TokenPayload> = match resp.json().await {
        Ok(env) => env,
        Err(e) => {
            warn!("refresh: malformed backend response: {e}");
            return ProxyError::Upstream.to_response().into_response();
        }
    };

    if !status.is_success() {
        warn!(status = status.as_u16(), "refresh rejected by backend");
        return (status, Json(ApiResponse::<()>::err(envelope.code, envelope.msg)))
            .into_response();
    }
    if envelope.code != 0 {
        warn!(code = envelope.code, "refresh rejected: {}", envelope.msg);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::err(envelope.code, envelope.msg)),
        )
            .into_response();
    }

    let Some(token) = envelope.data else {
        warn!("refresh: success envelope without token payload");
        return ProxyError::Upstream.to_response().into_response();
    };

    let secure = state.config.secure_cookies;
    let mut jar = jar.add(cookies::access_cookie(&token.access_token, token.expires_in, secure));
    if !token.refresh_token.is_empty() {
        jar = jar.add(cookies::refresh_cookie(&token.refresh_token, secure));
    }

    debug!(
        access_expires_at = token.access_expires_at,
        "refresh: token pair rotated"
    );
    (jar, Json(ApiResponse::ok(token))).into_response()
}

/// POST /api/auth/logout. Best-effort server revocation; cookies are cleared
/// regardless of the backend's answer.
pub async fn logout(State(state): State<Arc<ProxyState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(access) = jar.get(ACCESS_COOKIE).map(|c| c.value().to_owned()) {
        let url = state.backend_url("/api/auth/logout");
        if let Err(e) = state.http.post(&url).bearer_auth(&access).send().await {
            warn!("logout: backend call failed: {e}");
        }
    }

    let jar = jar
        .add(cookies::clear_cookie(ACCESS_COOKIE))
        .add(cookies::clear_cookie(REFRESH_COOKIE));
    (jar, Json(ApiResponse::ok(()))).into_response()
}

/// GET /api/auth/me. Forwards the current user with the access cookie as a
/// bearer token.
pub async fn me(State(state): State<Arc<ProxyState>>, jar: CookieJar) -> impl IntoResponse {
    let Some(access) = jar.get(ACCESS_COOKIE).map(|c| c.value().to_owned()) else {
        return ProxyError::Unauthorized.to_response().into_response();
    };

    let url = state.backend_url("/api/auth/me");
    let resp = match state.http.get(&url).bearer_auth(&access).send().await {
        Ok(r) => r,
        Err(e) => {
            warn!("me: backend unreachable: {e}");
            return ProxyError::Upstream.to_response().into_response();
        }
    };
    forward_envelope::<User>(resp).await
}

fn body_json(body: &SendCodeRequest) -> serde_json::Value {
    json!({"phone": body.phone})
}

/// Forward a backend envelope response as-is, keeping its HTTP status.
async fn forward_envelope<T>(resp: reqwest::Response) -> axum::response::Response
where
    T: serde::de::DeserializeOwned + serde::Serialize,
{
    let status = bridge_status(resp.status());
    match resp.json::<ApiResponse<T>>().await {
        Ok(envelope) => (status, Json(envelope)).into_response(),
        Err(e) => {
            warn!("malformed backend response: {e}");
            ProxyError::Upstream.to_response().into_response()
        }
    }
}

/// reqwest and axum may pin different `http` majors; convert by value.
fn bridge_status(status: reqwest::StatusCode) -> StatusCode {
    StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY)
}

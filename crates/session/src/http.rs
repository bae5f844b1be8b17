// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared HTTP plumbing for talking to the auth proxy.
//!
//! One reqwest client with a cookie jar, shared by the auth client and the
//! refresher so login, refresh, and logout all see the same cookies.

use std::sync::{Arc, Once};
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;

static INIT: Once = Once::new();

/// Install the rustls crypto provider (needed for reqwest even on plain HTTP).
pub fn ensure_crypto_provider() {
    INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// HTTP client bound to one proxy origin, with cookie persistence.
pub struct ProxyHttp {
    base_url: String,
    base: Url,
    jar: Arc<Jar>,
    client: reqwest::Client,
}

impl ProxyHttp {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        ensure_crypto_provider();
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let base: Url = base_url.parse()?;
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .cookie_provider(Arc::clone(&jar))
            .build()?;
        Ok(Self { base_url, base, jar, client })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Whether a cookie with the given name would be sent to the proxy.
    ///
    /// Presence only — the cookie's value may be an expired token; the
    /// backend contract tolerates that for refresh.
    pub fn has_cookie(&self, name: &str) -> bool {
        let Some(header) = self.jar.cookies(&self.base) else {
            return false;
        };
        let Ok(cookies) = header.to_str() else {
            return false;
        };
        cookies
            .split(';')
            .any(|pair| pair.trim().strip_prefix(name).is_some_and(|rest| rest.starts_with('=')))
    }

    /// Seed a cookie into the jar (test setups and manual session injection).
    pub fn add_cookie(&self, cookie: &str) {
        self.jar.add_cookie_str(cookie, &self.base);
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;

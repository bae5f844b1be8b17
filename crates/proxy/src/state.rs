// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::config::ProxyConfig;

/// Shared proxy state.
pub struct ProxyState {
    pub config: ProxyConfig,
    /// Client for backend calls. No cookie store: tokens travel explicitly
    /// in headers/bodies, cookies exist only between browser and proxy.
    pub http: reqwest::Client,
}

impl ProxyState {
    pub fn new(config: ProxyConfig) -> Self {
        // Client construction needs the provider installed, and library
        // consumers (tests included) reach here without going through run().
        passkeep::http::ensure_crypto_provider();
        let http = reqwest::Client::builder()
            .timeout(config.backend_timeout())
            .build()
            .unwrap_or_default();
        Self { config, http }
    }

    pub fn backend_url(&self, path: &str) -> String {
        format!("{}{}", self.config.backend_url.trim_end_matches('/'), path)
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Configuration for the passkeepd auth proxy.
#[derive(Debug, Clone, clap::Parser)]
pub struct ProxyConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "PASSKEEP_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 9700, env = "PASSKEEP_PORT")]
    pub port: u16,

    /// Base URL of the raw auth backend.
    #[arg(long, default_value = "http://localhost:8000", env = "PASSKEEP_BACKEND_URL")]
    pub backend_url: String,

    /// Mark cookies `Secure`. Enable in production behind TLS.
    #[arg(long, env = "PASSKEEP_SECURE_COOKIES")]
    pub secure_cookies: bool,

    /// Backend request timeout in milliseconds.
    #[arg(long, default_value_t = 10_000, env = "PASSKEEP_BACKEND_TIMEOUT_MS")]
    pub backend_timeout_ms: u64,
}

impl ProxyConfig {
    pub fn backend_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.backend_timeout_ms)
    }
}

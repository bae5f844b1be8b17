// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle events fanned out to consumers.

use serde::{Deserialize, Serialize};

/// Events emitted by the refresh scheduler.
///
/// `SignedOut` is the navigation signal: consumers are expected to route the
/// user to the login entry point when they receive it. No error dialog is
/// warranted — re-authenticating is the recovery action itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A refresh timer was armed.
    RefreshScheduled { delay_secs: u64 },
    /// A scheduled refresh succeeded and the expiry advanced.
    Refreshed { access_expires_at: i64 },
    /// The session degraded to signed-out.
    SignedOut { reason: String },
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock reconciliation between server-reported time and the local clock.
//!
//! Expiry math must never trust the local clock directly: a skewed client
//! would refresh too early or, worse, present an expired token. The offset
//! is captured once per token issuance from the server's own timestamp
//! (which also folds in roughly half the network round trip).

use std::time::{SystemTime, UNIX_EPOCH};

/// Current local Unix time in whole seconds.
pub fn epoch_secs() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
}

/// Offset between server time and local time (`server - local`), in seconds.
///
/// Pure; callers pass the server timestamp returned by login or refresh and
/// the local time sampled when the response arrived.
pub fn compute_offset(server_time_sec: i64, local_now_sec: i64) -> i64 {
    server_time_sec - local_now_sec
}

/// Local time corrected into the server's clock domain.
///
/// Every future expiry check uses this, never raw local time.
pub fn adjusted_now(offset_sec: i64) -> i64 {
    epoch_secs() + offset_sec
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side route guard: whether protected content may render.
//!
//! The server-side counterpart (cookie presence check in `passkeepd`) is a
//! deliberately independent, coarser gate; this one sees full session state.

use crate::store::{CredentialStore, SessionStatus};

/// Login entry point that unauthenticated sessions are sent to.
pub const LOGIN_PATH: &str = "/login";

/// What a protected view should do right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Persisted state not loaded yet: render nothing, wait. Avoids a flash
    /// of redirect before hydration settles.
    Suspend,
    /// Not authenticated (or not yet known): navigate to [`LOGIN_PATH`].
    RedirectToLogin,
    /// Session is authenticated: render.
    Allow,
}

/// Evaluate the guard against current store state.
pub fn evaluate(store: &CredentialStore) -> GuardDecision {
    if !store.has_hydrated() {
        return GuardDecision::Suspend;
    }
    match store.status() {
        SessionStatus::Authenticated => GuardDecision::Allow,
        SessionStatus::Unknown | SessionStatus::Unauthenticated => GuardDecision::RedirectToLogin,
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;

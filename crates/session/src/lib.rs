// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Passkeep: client-side session/token lifecycle management.
//!
//! Keeps an authenticated session alive transparently: a persisted
//! [`store::CredentialStore`] is the single source of truth for session
//! state, a [`scheduler::RefreshScheduler`] arms exactly one proactive
//! refresh timer ahead of access-token expiry (clock-skew corrected via
//! [`clock`]), and the [`refresh::HttpRefresher`] exchanges tokens through
//! the `passkeepd` proxy which owns the HTTP-only cookies. On any refresh
//! failure the session degrades to signed-out and consumers are told to
//! navigate to the login page.

pub mod client;
pub mod clock;
pub mod error;
pub mod events;
pub mod guard;
pub mod http;
pub mod persist;
pub mod refresh;
pub mod scheduler;
pub mod store;
pub mod types;

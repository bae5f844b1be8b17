// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The credential store: single source of truth for session state.
//!
//! Constructor-injected storage, synchronous mutations under one lock, and a
//! `watch` channel that notifies the scheduler whenever the access-token
//! expiry changes. Nothing outside this module mutates session state.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::persist::{Snapshot, StorageBackend};
use crate::types::User;

/// Whether the current session is authenticated.
///
/// `Unknown` until hydration and the first login/me round trip settle the
/// question; protected content must not render while `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// The full in-memory credential record.
#[derive(Debug, Clone)]
struct CredentialRecord {
    status: SessionStatus,
    user: Option<User>,
    access_expires_at: Option<i64>,
    server_time_offset_sec: i64,
    has_hydrated: bool,
}

impl Default for CredentialRecord {
    fn default() -> Self {
        Self {
            status: SessionStatus::Unknown,
            user: None,
            access_expires_at: None,
            server_time_offset_sec: 0,
            has_hydrated: false,
        }
    }
}

/// Process-wide session state with persistence.
///
/// Mutations are synchronous and atomic: the persisted snapshot is written
/// under the same lock that guards the record, so a reader can never observe
/// state that is newer than what is on disk. Expiry changes are pushed to
/// [`watch_expiry`](Self::watch_expiry) subscribers after the lock drops.
pub struct CredentialStore {
    record: Mutex<CredentialRecord>,
    storage: Box<dyn StorageBackend>,
    expiry_tx: watch::Sender<Option<i64>>,
}

impl CredentialStore {
    pub fn new(storage: impl StorageBackend + 'static) -> Self {
        let (expiry_tx, _) = watch::channel(None);
        Self { record: Mutex::new(CredentialRecord::default()), storage: Box::new(storage), expiry_tx }
    }

    /// Load the persisted snapshot into memory.
    ///
    /// `status` stays `Unknown` regardless of what was loaded — only a live
    /// login or `me` fetch may claim the session is authenticated. A missing
    /// snapshot is a valid first run. Idempotent: hydration happens once.
    pub fn hydrate(&self) -> anyhow::Result<()> {
        let snapshot = self.storage.load()?;
        let mut rec = self.record.lock();
        if rec.has_hydrated {
            return Ok(());
        }
        if let Some(snap) = snapshot {
            rec.user = snap.user;
            rec.access_expires_at = snap.access_expires_at;
            rec.server_time_offset_sec = snap.server_time_offset_sec;
        }
        rec.has_hydrated = true;
        let expiry = rec.access_expires_at;
        drop(rec);
        tracing::debug!(?expiry, "credential store hydrated");
        self.notify_expiry(expiry);
        Ok(())
    }

    /// Mark the session authenticated.
    ///
    /// An absent `access_expires_at` keeps the previous expiry (login flows
    /// that fetch the user after the token was already recorded pass `None`).
    pub fn set_authenticated(&self, user: User, access_expires_at: Option<i64>) -> anyhow::Result<()> {
        let mut rec = self.record.lock();
        rec.status = SessionStatus::Authenticated;
        rec.user = Some(user);
        if let Some(expires_at) = access_expires_at {
            rec.access_expires_at = Some(expires_at);
        }
        let expiry = rec.access_expires_at;
        let result = self.persist_locked(&rec);
        drop(rec);
        self.notify_expiry(expiry);
        result
    }

    /// Degrade to signed-out: clears identity, expiry, and clock offset.
    pub fn set_unauthenticated(&self) -> anyhow::Result<()> {
        let mut rec = self.record.lock();
        rec.status = SessionStatus::Unauthenticated;
        rec.user = None;
        rec.access_expires_at = None;
        rec.server_time_offset_sec = 0;
        let result = self.persist_locked(&rec);
        drop(rec);
        self.notify_expiry(None);
        result
    }

    /// Replace the identity snapshot without touching status or expiry.
    pub fn set_user(&self, user: User) -> anyhow::Result<()> {
        let mut rec = self.record.lock();
        rec.user = Some(user);
        self.persist_locked(&rec)
    }

    /// Record a new access-token expiry (re-arms the scheduler).
    pub fn set_access_expires_at(&self, expires_at: i64) -> anyhow::Result<()> {
        let mut rec = self.record.lock();
        rec.access_expires_at = Some(expires_at);
        let result = self.persist_locked(&rec);
        drop(rec);
        self.notify_expiry(Some(expires_at));
        result
    }

    /// Record the server/local clock offset from the latest token issuance.
    pub fn set_server_time_offset_sec(&self, offset_sec: i64) -> anyhow::Result<()> {
        let mut rec = self.record.lock();
        rec.server_time_offset_sec = offset_sec;
        self.persist_locked(&rec)
    }

    pub fn status(&self) -> SessionStatus {
        self.record.lock().status
    }

    pub fn user(&self) -> Option<User> {
        self.record.lock().user.clone()
    }

    pub fn access_expires_at(&self) -> Option<i64> {
        self.record.lock().access_expires_at
    }

    pub fn server_time_offset_sec(&self) -> i64 {
        self.record.lock().server_time_offset_sec
    }

    pub fn has_hydrated(&self) -> bool {
        self.record.lock().has_hydrated
    }

    /// Subscribe to access-token expiry changes.
    ///
    /// The receiver's current value is the latest expiry; a change is
    /// delivered for every transition, including `None → Some` and
    /// `Some → None`.
    pub fn watch_expiry(&self) -> watch::Receiver<Option<i64>> {
        self.expiry_tx.subscribe()
    }

    fn persist_locked(&self, rec: &CredentialRecord) -> anyhow::Result<()> {
        let snapshot = Snapshot {
            user: rec.user.clone(),
            access_expires_at: rec.access_expires_at,
            server_time_offset_sec: rec.server_time_offset_sec,
        };
        self.storage.save(&snapshot)
    }

    fn notify_expiry(&self, expiry: Option<i64>) {
        self.expiry_tx.send_if_modified(|current| {
            if *current != expiry {
                *current = expiry;
                true
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Proactive token refresh scheduling.
//!
//! Whenever the store holds an access-token expiry, exactly one timer is
//! armed to fire a safety margin before that expiry. Expiry changes re-arm
//! reactively through the store's watch channel; arming always cancels the
//! previous timer first, so duplicate concurrent refreshes for one session
//! cannot happen. Refresh failure of any kind degrades the session to
//! signed-out — the timer callback never propagates an error.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::clock;
use crate::events::SessionEvent;
use crate::refresh::TokenRefresher;
use crate::store::CredentialStore;

/// Lead time before expiry at which the refresh fires.
pub const SAFETY_MARGIN_SECS: i64 = 60;

/// Delay until the next refresh attempt.
///
/// `max(0, expires_at - (local_now + offset) - margin)` — clamps to zero when
/// the margin has already passed (e.g. the app resumed from a long sleep),
/// in which case the refresh fires immediately.
pub fn refresh_delay(access_expires_at: i64, offset_sec: i64, local_now_sec: i64) -> Duration {
    let adjusted_now = local_now_sec + offset_sec;
    let secs = (access_expires_at - adjusted_now - SAFETY_MARGIN_SECS).max(0);
    Duration::from_secs(secs as u64)
}

/// A pending refresh timer. Dropped on cancel; at most one exists.
struct TimerHandle {
    cancel: CancellationToken,
}

/// Arms and fires the per-session refresh timer.
pub struct RefreshScheduler {
    store: Arc<CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    timer: Mutex<Option<TimerHandle>>,
    event_tx: broadcast::Sender<SessionEvent>,
    shutdown: CancellationToken,
}

impl RefreshScheduler {
    pub fn new(store: Arc<CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(32);
        Arc::new(Self {
            store,
            refresher,
            timer: Mutex::new(None),
            event_tx,
            shutdown: CancellationToken::new(),
        })
    }

    /// Subscribe to scheduler events. `SignedOut` is the cue to navigate to
    /// the login page.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Start the watcher task that re-arms on every expiry change.
    pub fn spawn(self: &Arc<Self>) {
        let sched = Arc::clone(self);
        tokio::spawn(async move {
            let mut rx = sched.store.watch_expiry();
            // Hydration may already have restored an expiry.
            if let Some(expires_at) = *rx.borrow_and_update() {
                sched.arm(expires_at);
            }
            loop {
                tokio::select! {
                    _ = sched.shutdown.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let expiry = *rx.borrow_and_update();
                        match expiry {
                            Some(expires_at) => sched.arm(expires_at),
                            None => sched.disarm(),
                        }
                    }
                }
            }
            sched.disarm();
        });
    }

    /// Cancel the watcher and any pending timer.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.disarm();
    }

    fn arm(self: &Arc<Self>, expires_at: i64) {
        self.disarm();
        let delay =
            refresh_delay(expires_at, self.store.server_time_offset_sec(), clock::epoch_secs());
        tracing::debug!(delay_secs = delay.as_secs(), expires_at, "refresh timer armed");
        let _ = self.event_tx.send(SessionEvent::RefreshScheduled { delay_secs: delay.as_secs() });

        let cancel = self.shutdown.child_token();
        let timer_token = cancel.clone();
        let sched = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                // Cancellation wins over a concurrently elapsed sleep.
                biased;
                _ = timer_token.cancelled() => {}
                _ = tokio::time::sleep(delay) => sched.fire().await,
            }
        });
        *self.timer.lock() = Some(TimerHandle { cancel });
    }

    fn disarm(&self) {
        if let Some(handle) = self.timer.lock().take() {
            handle.cancel.cancel();
        }
    }

    /// Timer fired: attempt the refresh and apply the outcome to the store.
    async fn fire(&self) {
        match self.refresher.refresh().await {
            Ok(token) => {
                let offset = clock::compute_offset(token.server_time, clock::epoch_secs());
                // Offset first: the re-arm triggered by the expiry change
                // below must already see the corrected clock.
                if let Err(e) = self.store.set_server_time_offset_sec(offset) {
                    tracing::warn!(err = %e, "failed to persist clock offset");
                }
                if let Err(e) = self.store.set_access_expires_at(token.access_expires_at) {
                    tracing::warn!(err = %e, "failed to persist access expiry");
                }
                tracing::info!(
                    access_expires_at = token.access_expires_at,
                    offset_sec = offset,
                    "access token refreshed"
                );
                let _ = self
                    .event_tx
                    .send(SessionEvent::Refreshed { access_expires_at: token.access_expires_at });
            }
            Err(e) => {
                tracing::warn!(err = %e, "token refresh failed, signing out");
                if let Err(pe) = self.store.set_unauthenticated() {
                    tracing::warn!(err = %pe, "failed to persist signed-out state");
                }
                let _ = self.event_tx.send(SessionEvent::SignedOut { reason: e.to_string() });
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::*;
use crate::error::RefreshError;
use crate::events::SessionEvent;
use crate::persist::MemoryStorage;
use crate::store::SessionStatus;
use crate::types::{TokenPayload, User};

// -- Pure delay math ---------------------------------------------------------

#[test]
fn delay_is_time_left_minus_margin() {
    assert_eq!(refresh_delay(10_000, 0, 6_000), Duration::from_secs(3_940));
}

#[test]
fn delay_clamps_to_zero_at_or_past_margin() {
    // 30s left: already inside the safety margin.
    assert_eq!(refresh_delay(10_000, 0, 9_970), Duration::from_secs(0));
    // Expiry in the past (resumed from a long sleep).
    assert_eq!(refresh_delay(10_000, 0, 20_000), Duration::from_secs(0));
    // Exactly at the margin boundary.
    assert_eq!(refresh_delay(10_000, 0, 9_940), Duration::from_secs(0));
}

#[test]
fn offset_shifts_delay_by_exactly_that_amount() {
    let expires_at = 100_000;
    let local_now = 50_000;
    let base = refresh_delay(expires_at, 0, local_now).as_secs() as i64;
    for offset in [-120, -5, 0, 5, 120] {
        let shifted = refresh_delay(expires_at, offset, local_now).as_secs() as i64;
        assert_eq!(shifted, base - offset, "offset {offset}");
    }
}

#[test]
fn login_scenario_delay() {
    // Login at T0 with expires_in=3600 and server_time=T0+5:
    // accessExpiresAt = T0+3605, offset = 5, delay = 3605 - 5 - 60 = 3540.
    let t0 = 1_000_000;
    assert_eq!(refresh_delay(t0 + 3_605, 5, t0), Duration::from_secs(3_540));
}

// -- Scheduler state machine -------------------------------------------------

struct MockRefresher {
    calls: AtomicU32,
    respond: Box<dyn Fn(u32) -> Result<TokenPayload, RefreshError> + Send + Sync>,
}

impl MockRefresher {
    fn new(
        respond: impl Fn(u32) -> Result<TokenPayload, RefreshError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self { calls: AtomicU32::new(0), respond: Box::new(respond) })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for MockRefresher {
    async fn refresh(&self) -> Result<TokenPayload, RefreshError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(n)
    }
}

fn payload(access_expires_at: i64, server_time: i64) -> TokenPayload {
    TokenPayload {
        access_token: "at-new".to_owned(),
        refresh_token: "rt-new".to_owned(),
        token_type: "bearer".to_owned(),
        expires_in: 3_600,
        server_time,
        access_expires_at,
        refresh_expires_at: server_time + 7 * 24 * 3_600,
    }
}

fn test_user() -> User {
    User {
        id: 1,
        phone: "13800000000".to_owned(),
        name: None,
        avatar: None,
        created_at: "2026-01-01T00:00:00Z".to_owned(),
        last_login_at: None,
        is_active: true,
        is_superuser: false,
    }
}

async fn next_event(
    rx: &mut tokio::sync::broadcast::Receiver<SessionEvent>,
) -> anyhow::Result<SessionEvent> {
    // Generous bound: under paused time the runtime only reaches it when no
    // other timer is pending at all.
    Ok(tokio::time::timeout(Duration::from_secs(1_000_000), rx.recv()).await??)
}

#[tokio::test(start_paused = true)]
async fn arms_timer_with_margin_adjusted_delay() -> anyhow::Result<()> {
    let store = Arc::new(CredentialStore::new(MemoryStorage::new()));
    let mock = MockRefresher::new(|_| Err(RefreshError::NoRefreshToken));
    let sched = RefreshScheduler::new(Arc::clone(&store), mock);
    let mut events = sched.subscribe();

    store.set_access_expires_at(clock::epoch_secs() + 100_000)?;
    sched.spawn();

    match next_event(&mut events).await? {
        SessionEvent::RefreshScheduled { delay_secs } => {
            // Wall-clock sampling allows a second or two of slack.
            assert!(
                (99_936..=99_940).contains(&delay_secs),
                "unexpected delay {delay_secs}"
            );
        }
        other => anyhow::bail!("expected RefreshScheduled, got {other:?}"),
    }
    sched.shutdown();
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn rapid_expiry_changes_arm_a_single_timer() -> anyhow::Result<()> {
    let store = Arc::new(CredentialStore::new(MemoryStorage::new()));
    let final_expiry = clock::epoch_secs() + 9_000;
    let mock = MockRefresher::new(move |_| Ok(payload(final_expiry, clock::epoch_secs())));
    let sched = RefreshScheduler::new(Arc::clone(&store), Arc::clone(&mock) as _);
    let mut events = sched.subscribe();

    // Two supersessions before the watcher runs: only the last value counts.
    store.set_access_expires_at(clock::epoch_secs() + 5_000)?;
    store.set_access_expires_at(final_expiry)?;
    sched.spawn();

    match next_event(&mut events).await? {
        SessionEvent::RefreshScheduled { delay_secs } => {
            assert!((8_936..=8_940).contains(&delay_secs), "unexpected delay {delay_secs}");
        }
        other => anyhow::bail!("expected RefreshScheduled, got {other:?}"),
    }

    // Paused time auto-advances to the timer; the refresh returns the same
    // expiry, so the chain settles after exactly one attempt.
    match next_event(&mut events).await? {
        SessionEvent::Refreshed { access_expires_at } => {
            assert_eq!(access_expires_at, final_expiry);
        }
        other => anyhow::bail!("expected Refreshed, got {other:?}"),
    }
    assert_eq!(mock.calls(), 1);
    sched.shutdown();
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn superseding_expiry_cancels_pending_timer() -> anyhow::Result<()> {
    let store = Arc::new(CredentialStore::new(MemoryStorage::new()));
    let mock = MockRefresher::new(|_| {
        Err(RefreshError::Rejected { status: 500, message: "boom".to_owned() })
    });
    let sched = RefreshScheduler::new(Arc::clone(&store), Arc::clone(&mock) as _);
    let mut events = sched.subscribe();

    store.set_access_expires_at(clock::epoch_secs() + 100_000)?;
    sched.spawn();
    match next_event(&mut events).await? {
        SessionEvent::RefreshScheduled { .. } => {}
        other => anyhow::bail!("expected RefreshScheduled, got {other:?}"),
    }

    // Supersede with an already-expired value: re-arm fires immediately.
    store.set_access_expires_at(clock::epoch_secs() - 100)?;
    match next_event(&mut events).await? {
        SessionEvent::RefreshScheduled { delay_secs } => assert_eq!(delay_secs, 0),
        other => anyhow::bail!("expected RefreshScheduled, got {other:?}"),
    }
    match next_event(&mut events).await? {
        SessionEvent::SignedOut { .. } => {}
        other => anyhow::bail!("expected SignedOut, got {other:?}"),
    }

    // The original 100_000s timer must have been cancelled, not just beaten.
    tokio::time::advance(Duration::from_secs(200_000)).await;
    tokio::task::yield_now().await;
    assert_eq!(mock.calls(), 1, "cancelled timer still fired");
    sched.shutdown();
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn successful_refresh_updates_store_and_rearms() -> anyhow::Result<()> {
    let store = Arc::new(CredentialStore::new(MemoryStorage::new()));
    store.set_authenticated(test_user(), None)?;

    let base = clock::epoch_secs();
    let new_expiry = base + 3_600;
    let mock = MockRefresher::new(move |_| Ok(payload(new_expiry, clock::epoch_secs() + 5)));
    let sched = RefreshScheduler::new(Arc::clone(&store), Arc::clone(&mock) as _);
    let mut events = sched.subscribe();

    // Already past the margin: fires immediately.
    store.set_access_expires_at(base - 10)?;
    sched.spawn();

    match next_event(&mut events).await? {
        SessionEvent::RefreshScheduled { delay_secs } => assert_eq!(delay_secs, 0),
        other => anyhow::bail!("expected RefreshScheduled, got {other:?}"),
    }
    match next_event(&mut events).await? {
        SessionEvent::Refreshed { access_expires_at } => assert_eq!(access_expires_at, new_expiry),
        other => anyhow::bail!("expected Refreshed, got {other:?}"),
    }

    // Store reflects the new pair and the corrected clock.
    assert_eq!(store.access_expires_at(), Some(new_expiry));
    assert!((3..=7).contains(&store.server_time_offset_sec()));
    assert_eq!(store.status(), SessionStatus::Authenticated);

    // Never idle while authenticated: a new timer is armed with the new
    // expiry and the refreshed offset (≈ 3600 - 5 - 60).
    match next_event(&mut events).await? {
        SessionEvent::RefreshScheduled { delay_secs } => {
            assert!((3_528..=3_542).contains(&delay_secs), "unexpected delay {delay_secs}");
        }
        other => anyhow::bail!("expected RefreshScheduled, got {other:?}"),
    }
    sched.shutdown();
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn missing_refresh_token_signs_out_without_retry() -> anyhow::Result<()> {
    let store = Arc::new(CredentialStore::new(MemoryStorage::new()));
    store.set_authenticated(test_user(), Some(clock::epoch_secs() - 10))?;
    store.set_server_time_offset_sec(9)?;

    let mock = MockRefresher::new(|_| Err(RefreshError::NoRefreshToken));
    let sched = RefreshScheduler::new(Arc::clone(&store), Arc::clone(&mock) as _);
    let mut events = sched.subscribe();
    sched.spawn();

    loop {
        match next_event(&mut events).await? {
            SessionEvent::SignedOut { reason } => {
                assert_eq!(reason, "no refresh token");
                break;
            }
            SessionEvent::RefreshScheduled { .. } => continue,
            other => anyhow::bail!("unexpected event {other:?}"),
        }
    }

    assert_eq!(store.status(), SessionStatus::Unauthenticated);
    assert!(store.user().is_none());
    assert!(store.access_expires_at().is_none());
    assert_eq!(store.server_time_offset_sec(), 0);
    assert_eq!(mock.calls(), 1);
    sched.shutdown();
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn backend_rejection_signs_out_identically() -> anyhow::Result<()> {
    let store = Arc::new(CredentialStore::new(MemoryStorage::new()));
    store.set_authenticated(test_user(), Some(clock::epoch_secs() - 10))?;

    let mock = MockRefresher::new(|_| {
        Err(RefreshError::Rejected { status: 500, message: "internal".to_owned() })
    });
    let sched = RefreshScheduler::new(Arc::clone(&store), mock);
    let mut events = sched.subscribe();
    sched.spawn();

    loop {
        match next_event(&mut events).await? {
            SessionEvent::SignedOut { .. } => break,
            SessionEvent::RefreshScheduled { .. } => continue,
            other => anyhow::bail!("unexpected event {other:?}"),
        }
    }

    // Same end state as the missing-cookie case, different trigger.
    assert_eq!(store.status(), SessionStatus::Unauthenticated);
    assert!(store.user().is_none());
    assert!(store.access_expires_at().is_none());
    assert_eq!(store.server_time_offset_sec(), 0);
    sched.shutdown();
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn clearing_expiry_disarms_the_timer() -> anyhow::Result<()> {
    let store = Arc::new(CredentialStore::new(MemoryStorage::new()));
    let mock = MockRefresher::new(|_| Err(RefreshError::NoRefreshToken));
    let sched = RefreshScheduler::new(Arc::clone(&store), Arc::clone(&mock) as _);
    let mut events = sched.subscribe();

    store.set_access_expires_at(clock::epoch_secs() + 50_000)?;
    sched.spawn();
    match next_event(&mut events).await? {
        SessionEvent::RefreshScheduled { .. } => {}
        other => anyhow::bail!("expected RefreshScheduled, got {other:?}"),
    }

    store.set_unauthenticated()?;
    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_secs(100_000)).await;
    tokio::task::yield_now().await;
    assert_eq!(mock.calls(), 0, "disarmed timer still fired");
    sched.shutdown();
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_timer() -> anyhow::Result<()> {
    let store = Arc::new(CredentialStore::new(MemoryStorage::new()));
    let mock = MockRefresher::new(|_| Err(RefreshError::NoRefreshToken));
    let sched = RefreshScheduler::new(Arc::clone(&store), Arc::clone(&mock) as _);
    let mut events = sched.subscribe();

    store.set_access_expires_at(clock::epoch_secs() + 50_000)?;
    sched.spawn();
    match next_event(&mut events).await? {
        SessionEvent::RefreshScheduled { .. } => {}
        other => anyhow::bail!("expected RefreshScheduled, got {other:?}"),
    }

    sched.shutdown();
    tokio::time::advance(Duration::from_secs(100_000)).await;
    tokio::task::yield_now().await;
    assert_eq!(mock.calls(), 0);
    Ok(())
}

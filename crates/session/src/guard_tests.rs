// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::persist::MemoryStorage;
use crate::types::User;

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

#[test]
fn suspends_before_hydration_regardless_of_status() -> anyhow::Result<()> {
    let store = CredentialStore::new(MemoryStorage::new());
    assert_eq!(evaluate(&store), GuardDecision::Suspend);

    // Even an authenticated-looking record suspends until hydration ran.
    store.set_authenticated(test_user(), Some(1_900_000_000))?;
    assert_eq!(evaluate(&store), GuardDecision::Suspend);
    Ok(())
}

#[test]
fn redirects_when_hydrated_but_not_authenticated() -> anyhow::Result<()> {
    let store = CredentialStore::new(MemoryStorage::new());
    store.hydrate()?;
    // Status is Unknown after hydration: still no protected content.
    assert_eq!(evaluate(&store), GuardDecision::RedirectToLogin);

    store.set_unauthenticated()?;
    assert_eq!(evaluate(&store), GuardDecision::RedirectToLogin);
    Ok(())
}

#[test]
fn allows_when_hydrated_and_authenticated() -> anyhow::Result<()> {
    let store = CredentialStore::new(MemoryStorage::new());
    store.hydrate()?;
    store.set_authenticated(test_user(), Some(1_900_000_000))?;
    assert_eq!(evaluate(&store), GuardDecision::Allow);
    Ok(())
}

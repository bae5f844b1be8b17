// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential snapshot persistence: load/save JSON with atomic writes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::User;

/// The persisted subset of the credential record.
///
/// `status` and `has_hydrated` are deliberately absent: both are recomputed
/// on every process start, never trusted from disk.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Access-token expiry as epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_expires_at: Option<i64>,
    /// `server_time - local_time` at last token issuance.
    #[serde(default)]
    pub server_time_offset_sec: i64,
}

/// Storage backend for the credential store snapshot.
///
/// File-backed in production, in-memory for tests. Load/save failures
/// propagate to the store's caller; the session core does not try to
/// recover from a broken storage layer.
pub trait StorageBackend: Send + Sync {
    /// Load the previously persisted snapshot. `None` on first run.
    fn load(&self) -> anyhow::Result<Option<Snapshot>>;
    /// Durably save the snapshot.
    fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()>;
}

/// Resolve the state directory for passkeep data.
///
/// Checks `PASSKEEP_STATE_DIR`, then `$XDG_STATE_HOME/passkeep`,
/// then `$HOME/.local/state/passkeep`.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PASSKEEP_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("passkeep");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/state/passkeep");
    }
    PathBuf::from(".passkeep")
}

/// JSON file storage with atomic writes (write tmp + rename).
///
/// Uses a unique temp filename (PID + counter) to avoid corruption when
/// concurrent saves race on the same `.tmp` file — a shorter write can leave
/// trailing bytes from a longer previous write.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File storage at the default location (`state_dir()/session.json`).
    pub fn default_location() -> Self {
        Self::new(state_dir().join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileStorage {
    fn load(&self) -> anyhow::Result<Option<Snapshot>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: Snapshot = serde_json::from_str(&contents)?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        use std::sync::atomic::{AtomicU32, Ordering};
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        if let Some(dir) = self.path.parent() {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(
            "{}.{}.{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy(),
            std::process::id(),
            seq,
        );
        let tmp_path = self.path.with_file_name(tmp_name);
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// In-memory storage for tests.
#[derive(Default)]
pub struct MemoryStorage {
    slot: parking_lot::Mutex<Option<Snapshot>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded with a snapshot, as if a previous run had persisted it.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self { slot: parking_lot::Mutex::new(Some(snapshot)) }
    }

    /// Inspect the last saved snapshot.
    pub fn saved(&self) -> Option<Snapshot> {
        self.slot.lock().clone()
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self) -> anyhow::Result<Option<Snapshot>> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        *self.slot.lock() = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;

//! Reading and profile storage
//!
//! The engine reaches history and profiles only through [`ReadingStore`], so
//! any backend (in-memory map, time-series database) can sit behind it and
//! tests can use fixtures.
//!
//! [`InMemoryStore`] keeps one lock per user: appends and snapshots for a
//! user are serialized, while different users never contend.

use crate::error::StoreError;
use crate::types::{ContextProfile, Reading};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Storage capability required by the engine
pub trait ReadingStore: Send + Sync {
    /// Append a reading to a user's history, creating it on first use
    fn append_reading(&self, user_id: &str, reading: Reading) -> Result<(), StoreError>;

    /// Owned, time-ordered snapshot of a user's history (empty if unknown)
    fn history(&self, user_id: &str) -> Result<Vec<Reading>, StoreError>;

    fn profile(&self, user_id: &str) -> Result<Option<ContextProfile>, StoreError>;

    /// Store a profile, replacing any previous one
    fn set_profile(&self, user_id: &str, profile: ContextProfile) -> Result<(), StoreError>;

    /// Append a reading and return the history including it.
    ///
    /// Implementations that can be written to concurrently must make this
    /// atomic per user so the snapshot neither misses nor double counts.
    fn append_and_snapshot(&self, user_id: &str, reading: Reading) -> Result<Vec<Reading>, StoreError> {
        self.append_reading(user_id, reading)?;
        self.history(user_id)
    }
}

#[derive(Debug, Default)]
struct UserRecord {
    history: Vec<Reading>,
    profile: Option<ContextProfile>,
}

impl UserRecord {
    /// Insert keeping non-decreasing timestamp order (after equal timestamps)
    fn insert(&mut self, reading: Reading) {
        let in_order = self
            .history
            .last()
            .map_or(true, |last| last.timestamp <= reading.timestamp);
        if in_order {
            self.history.push(reading);
        } else {
            let pos = self
                .history
                .partition_point(|r| r.timestamp <= reading.timestamp);
            log::debug!("Out-of-order reading at {} inserted at {pos}", reading.timestamp);
            self.history.insert(pos, reading);
        }
    }
}

/// Process-local store with per-user locking
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<String, Arc<Mutex<UserRecord>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with any stored state
    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }

    /// Number of readings stored for a user
    pub fn reading_count(&self, user_id: &str) -> usize {
        self.existing(user_id).map_or(0, |record| record.lock().history.len())
    }

    fn existing(&self, user_id: &str) -> Option<Arc<Mutex<UserRecord>>> {
        self.users.read().get(user_id).cloned()
    }

    fn record(&self, user_id: &str) -> Arc<Mutex<UserRecord>> {
        if let Some(record) = self.existing(user_id) {
            return record;
        }
        self.users
            .write()
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }
}

impl ReadingStore for InMemoryStore {
    fn append_reading(&self, user_id: &str, reading: Reading) -> Result<(), StoreError> {
        self.record(user_id).lock().insert(reading);
        Ok(())
    }

    fn history(&self, user_id: &str) -> Result<Vec<Reading>, StoreError> {
        Ok(self
            .existing(user_id)
            .map(|record| record.lock().history.clone())
            .unwrap_or_default())
    }

    fn profile(&self, user_id: &str) -> Result<Option<ContextProfile>, StoreError> {
        Ok(self
            .existing(user_id)
            .and_then(|record| record.lock().profile.clone()))
    }

    fn set_profile(&self, user_id: &str, profile: ContextProfile) -> Result<(), StoreError> {
        self.record(user_id).lock().profile = Some(profile);
        Ok(())
    }

    fn append_and_snapshot(&self, user_id: &str, reading: Reading) -> Result<Vec<Reading>, StoreError> {
        let record = self.record(user_id);
        let mut guard = record.lock();
        guard.insert(reading);
        Ok(guard.history.clone())
    }
}

//! Shared per-user counter storage.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::base::types::UserId;

/// Which counter an increment applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    /// Messages received as a non-sender channel member.
    Inbox,
    /// Own messages flagged with the bookmark reaction.
    Saved,
}

/// Per-user counters. Both fields only ever grow within a process run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TallyRecord {
    pub inbox_count: u64,
    pub saved_count: u64,
}

#[derive(Default)]
struct StoreInner {
    records: HashMap<UserId, TallyRecord>,
    // First-observation order, so reports are stable run to run.
    order: Vec<UserId>,
}

/// Counter store for the tally engine.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// and shared between the event path and the reporter without further
/// wrapping. All access goes through a single lock; throughput is a handful
/// of events per second, so contention is not a concern.
#[derive(Clone, Default)]
pub struct CounterStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means another thread panicked mid-access; the
    // counters themselves are always coherent (each update is a single field
    // bump under the lock), so recover the guard rather than propagate.
    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Increments one counter for `user`, creating the record on first sight.
    pub fn increment(&self, user: &str, kind: CounterKind) {
        let mut inner = self.write();

        if !inner.records.contains_key(user) {
            inner.order.push(user.to_string());
        }

        let record = inner.records.entry(user.to_string()).or_default();

        match kind {
            CounterKind::Inbox => record.inbox_count += 1,
            CounterKind::Saved => record.saved_count += 1,
        }
    }

    /// Returns a point-in-time copy of every record, in the order users were
    /// first observed. The copy is taken under the lock, so no record can
    /// show a half-applied update.
    pub fn snapshot(&self) -> Vec<(UserId, TallyRecord)> {
        let inner = self.read();

        inner.order.iter().map(|user| (user.clone(), inner.records[user])).collect()
    }
}

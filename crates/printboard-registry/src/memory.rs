//! In-memory backend

use crate::backend::{sort_newest_first, RegistryBackend};
use dashmap::DashMap;
use printboard_core::{Fingerprint, StoreError};

/// Concurrent map keyed by fingerprint id. Writes to different keys never
/// contend on the same shard lock; writes to one key are last-write-wins.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: DashMap<String, Fingerprint>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Fingerprint> {
        self.entries.get(id).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl RegistryBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn upsert(&self, fingerprint: Fingerprint) -> Result<(), StoreError> {
        self.entries.insert(fingerprint.id.clone(), fingerprint);
        Ok(())
    }

    async fn list_since(&self, cutoff: i64) -> Result<Vec<Fingerprint>, StoreError> {
        let mut live: Vec<Fingerprint> = self
            .entries
            .iter()
            .filter(|e| e.value().timestamp > cutoff)
            .map(|e| e.value().clone())
            .collect();
        sort_newest_first(&mut live);
        Ok(live)
    }

    async fn delete_older_than(&self, cutoff: i64) -> Result<usize, StoreError> {
        // The predicate runs under each shard's write lock, so it sees the
        // entry's latest timestamp.
        let mut removed = 0;
        self.entries.retain(|_, fp| {
            let keep = fp.timestamp >= cutoff;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.entries.len())
    }
}

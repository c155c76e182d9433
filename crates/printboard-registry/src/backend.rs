//! Registry backend trait

use printboard_core::{Fingerprint, StoreError};

/// Storage contract shared by the durable and in-memory backends.
///
/// Cutoffs are absolute epoch milliseconds computed once by the caller.
/// Backends compare them against each entry's current timestamp.
#[async_trait::async_trait]
pub trait RegistryBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Insert, or overwrite the entry with the same id.
    async fn upsert(&self, fingerprint: Fingerprint) -> Result<(), StoreError>;

    /// Entries with `timestamp > cutoff`, newest first.
    async fn list_since(&self, cutoff: i64) -> Result<Vec<Fingerprint>, StoreError>;

    /// Delete entries with `timestamp < cutoff`. Returns how many were removed.
    async fn delete_older_than(&self, cutoff: i64) -> Result<usize, StoreError>;

    /// All entries, regardless of age.
    async fn count(&self) -> Result<usize, StoreError>;
}

/// Newest first; ties broken by id so listings are stable.
pub fn sort_newest_first(entries: &mut [Fingerprint]) {
    entries.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });
}

//! Registry store: freshness window, server-side timestamps, backend degrade.

use crate::backend::RegistryBackend;
use crate::clock::{Clock, SystemClock};
use crate::file::FileBackend;
use crate::memory::MemoryBackend;
use printboard_core::{BackendKind, Fingerprint, StoreError};
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

const DURABLE: u8 = 0;
const IN_MEMORY: u8 = 1;

/// Which backend serves requests. Only ever moves Durable -> InMemory.
#[derive(Debug)]
struct BackendSelector(AtomicU8);

impl BackendSelector {
    fn new(kind: BackendKind) -> Self {
        Self(AtomicU8::new(match kind {
            BackendKind::Durable => DURABLE,
            BackendKind::InMemory => IN_MEMORY,
        }))
    }

    fn current(&self) -> BackendKind {
        match self.0.load(Ordering::Acquire) {
            DURABLE => BackendKind::Durable,
            _ => BackendKind::InMemory,
        }
    }

    /// Returns true for the caller that performed the transition.
    fn degrade(&self) -> bool {
        self.0
            .compare_exchange(DURABLE, IN_MEMORY, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

pub struct RegistryStore {
    durable: Option<Arc<dyn RegistryBackend>>,
    memory: MemoryBackend,
    selector: BackendSelector,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RegistryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryStore")
            .field("backend", &self.selector.current())
            .field("memory_entries", &self.memory.len())
            .finish()
    }
}

impl RegistryStore {
    /// Memory-only store.
    pub fn in_memory() -> Self {
        Self::with_backend(None, Arc::new(SystemClock))
    }

    /// Durable store rooted at `data_dir`. When the directory cannot be
    /// opened the store starts (and stays) in memory.
    pub async fn open(data_dir: Option<&Path>) -> Self {
        let Some(dir) = data_dir else {
            info!("no data directory configured, using in-memory registry");
            return Self::in_memory();
        };
        match FileBackend::open(dir).await {
            Ok(backend) => {
                info!(dir = %backend.dir().display(), "using durable registry");
                Self::with_backend(Some(Arc::new(backend)), Arc::new(SystemClock))
            }
            Err(e) => {
                warn!(error = %e, "durable registry unavailable, using in-memory registry");
                Self::in_memory()
            }
        }
    }

    pub fn with_backend(durable: Option<Arc<dyn RegistryBackend>>, clock: Arc<dyn Clock>) -> Self {
        let kind = if durable.is_some() {
            BackendKind::Durable
        } else {
            BackendKind::InMemory
        };
        Self {
            durable,
            memory: MemoryBackend::new(),
            selector: BackendSelector::new(kind),
            clock,
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.selector.current()
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    fn active_durable(&self) -> Option<&Arc<dyn RegistryBackend>> {
        match self.selector.current() {
            BackendKind::Durable => self.durable.as_ref(),
            BackendKind::InMemory => None,
        }
    }

    fn degrade(&self, op: &str, err: &StoreError) {
        if self.selector.degrade() {
            warn!(op, error = %err, "durable registry failed, falling back to in-memory registry");
        } else {
            debug!(op, error = %err, "durable registry failed after fallback");
        }
    }

    /// Insert or refresh a fingerprint. The stored timestamp is the
    /// server's clock at the time of the call; whatever the caller sent is
    /// ignored. Returns the record as stored.
    pub async fn upsert(&self, fingerprint: Fingerprint) -> Result<Fingerprint, StoreError> {
        let fingerprint = fingerprint
            .normalized()
            .map_err(StoreError::InvalidFingerprint)?
            .with_timestamp(self.clock.now_millis());

        if let Some(durable) = self.active_durable() {
            match durable.upsert(fingerprint.clone()).await {
                Ok(()) => {
                    debug!(id = %fingerprint.short_id(), "fingerprint stored");
                    return Ok(fingerprint);
                }
                Err(e) => self.degrade("upsert", &e),
            }
        }

        self.memory.upsert(fingerprint.clone()).await?;
        debug!(id = %fingerprint.short_id(), "fingerprint stored in memory");
        Ok(fingerprint)
    }

    /// Fingerprints refreshed within the last `max_age_ms`, newest first.
    pub async fn list(&self, max_age_ms: i64) -> Result<Vec<Fingerprint>, StoreError> {
        let cutoff = self.clock.now_millis() - max_age_ms;
        if let Some(durable) = self.active_durable() {
            match durable.list_since(cutoff).await {
                Ok(live) => return Ok(live),
                Err(e) => self.degrade("list", &e),
            }
        }
        self.memory.list_since(cutoff).await
    }

    /// Delete fingerprints not refreshed within the last `max_age_ms`.
    pub async fn sweep(&self, max_age_ms: i64) -> Result<usize, StoreError> {
        let cutoff = self.clock.now_millis() - max_age_ms;
        if let Some(durable) = self.active_durable() {
            match durable.delete_older_than(cutoff).await {
                Ok(removed) => {
                    if removed > 0 {
                        info!(removed, "swept stale fingerprints");
                    }
                    return Ok(removed);
                }
                Err(e) => self.degrade("sweep", &e),
            }
        }
        let removed = self.memory.delete_older_than(cutoff).await?;
        if removed > 0 {
            info!(removed, "swept stale fingerprints");
        }
        Ok(removed)
    }

    /// Total stored entries, stale ones included.
    pub async fn count(&self) -> Result<usize, StoreError> {
        if let Some(durable) = self.active_durable() {
            match durable.count().await {
                Ok(n) => return Ok(n),
                Err(e) => self.degrade("count", &e),
            }
        }
        self.memory.count().await
    }
}

//! Durable backend: one JSON document per fingerprint.
//!
//! Layout: `<data_dir>/fingerprints/<id>.json`. Writes go to a unique
//! `*.json.tmp` sibling and are renamed into place, so readers only ever see
//! whole documents. A sweep holds the gate exclusively while upserts share
//! it, so a refresh can never land between a sweep's read and its unlink.

use crate::backend::{sort_newest_first, RegistryBackend};
use printboard_core::{Fingerprint, StoreError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

const ENTRY_DIR: &str = "fingerprints";
const NAME: &str = "database";

#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    gate: Arc<RwLock<()>>,
}

impl FileBackend {
    /// Open (creating if needed) the entry directory under `data_dir` and
    /// confirm it is writable.
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let dir = data_dir.join(ENTRY_DIR);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::backend(NAME, format!("{}: {}", dir.display(), e)))?;

        let probe = dir.join(format!(".probe-{}.tmp", uuid::Uuid::new_v4()));
        fs::write(&probe, b"ok")
            .await
            .map_err(|e| StoreError::backend(NAME, format!("{} not writable: {}", dir.display(), e)))?;
        let _ = fs::remove_file(&probe).await;

        debug!(dir = %dir.display(), "durable registry opened");
        Ok(Self {
            dir,
            gate: Arc::new(RwLock::new(())),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Paths of all committed entries. Temp files are skipped.
    async fn entry_paths(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut paths = Vec::new();
        let mut rd = fs::read_dir(&self.dir)
            .await
            .map_err(|e| StoreError::backend(NAME, e.to_string()))?;
        while let Some(entry) = rd
            .next_entry()
            .await
            .map_err(|e| StoreError::backend(NAME, e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Read one entry. `None` when it vanished mid-scan or is unreadable
    /// as a fingerprint.
    async fn read_entry(path: &Path) -> Result<Option<Fingerprint>, StoreError> {
        let raw = match fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::backend(NAME, format!("{}: {}", path.display(), e))),
        };
        match serde_json::from_str::<Fingerprint>(&raw) {
            Ok(fp) => Ok(Some(fp)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable registry entry");
                Ok(None)
            }
        }
    }
}

#[async_trait::async_trait]
impl RegistryBackend for FileBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn upsert(&self, fingerprint: Fingerprint) -> Result<(), StoreError> {
        let path = self.entry_path(&fingerprint.id);
        let tmp = self
            .dir
            .join(format!("{}.{}.json.tmp", fingerprint.id, uuid::Uuid::new_v4().simple()));
        let json = serde_json::to_vec_pretty(&fingerprint)?;

        let _shared = self.gate.read().await;
        if let Err(e) = fs::write(&tmp, &json).await {
            return Err(StoreError::backend(NAME, format!("{}: {}", tmp.display(), e)));
        }
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::backend(NAME, format!("{}: {}", path.display(), e)));
        }
        Ok(())
    }

    async fn list_since(&self, cutoff: i64) -> Result<Vec<Fingerprint>, StoreError> {
        let mut live = Vec::new();
        for path in self.entry_paths().await? {
            if let Some(fp) = Self::read_entry(&path).await? {
                if fp.timestamp > cutoff {
                    live.push(fp);
                }
            }
        }
        sort_newest_first(&mut live);
        Ok(live)
    }

    async fn delete_older_than(&self, cutoff: i64) -> Result<usize, StoreError> {
        let _exclusive = self.gate.write().await;
        let mut removed = 0;
        for path in self.entry_paths().await? {
            let Some(fp) = Self::read_entry(&path).await? else {
                continue;
            };
            if fp.timestamp >= cutoff {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(StoreError::backend(NAME, format!("{}: {}", path.display(), e)))
                }
            }
        }
        Ok(removed)
    }

    /// Entries that parse as fingerprints; unreadable files are not counted.
    async fn count(&self) -> Result<usize, StoreError> {
        let mut total = 0;
        for path in self.entry_paths().await? {
            if Self::read_entry(&path).await?.is_some() {
                total += 1;
            }
        }
        Ok(total)
    }
}

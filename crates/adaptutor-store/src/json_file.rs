//! JSON-file implementation of `ProgressStore`.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use async_trait::async_trait;
use tracing::instrument;

use adaptutor_core::error::StoreError;
use adaptutor_core::progress::{LearnerProgressRecord, ProgressStore, RecordKey};

use crate::layout::record_path;

/// Progress store backed by one JSON file per record.
///
/// Writes go to a temporary file in the target directory and are renamed
/// into place, so a crash never leaves a half-written record. Writers to
/// the same key are serialized in-process; the version check catches
/// writers that loaded a stale copy.
pub struct JsonFileStore {
    root: PathBuf,
    write_locks: Mutex<HashMap<RecordKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl JsonFileStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create data directory: {}", root.display()))?;
        Ok(Self {
            root,
            write_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write_lock(&self, key: &RecordKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .write_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(key.clone()).or_default())
    }

    /// Drop the map entry for `key` once no other writer holds or awaits it.
    fn release_write_lock(&self, key: &RecordKey, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .write_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // One reference in the map, one held here.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
    }

    async fn read(&self, key: &RecordKey) -> Result<Option<LearnerProgressRecord>, StoreError> {
        let path = record_path(&self.root, key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            })
    }
}

#[async_trait]
impl ProgressStore for JsonFileStore {
    async fn load(&self, key: &RecordKey) -> anyhow::Result<Option<LearnerProgressRecord>> {
        Ok(self.read(key).await?)
    }

    #[instrument(skip(self, record), fields(key = %record.key(), version = record.version))]
    async fn compare_and_swap(
        &self,
        record: LearnerProgressRecord,
    ) -> anyhow::Result<LearnerProgressRecord> {
        let key = record.key();
        let lock = self.write_lock(&key);
        let result = {
            let _guard = lock.lock().await;
            self.swap_locked(&key, record).await
        };
        self.release_write_lock(&key, lock);
        result
    }
}

impl JsonFileStore {
    async fn swap_locked(
        &self,
        key: &RecordKey,
        mut record: LearnerProgressRecord,
    ) -> anyhow::Result<LearnerProgressRecord> {
        let found = self.read(key).await?.map(|r| r.version).unwrap_or(0);
        if found != record.version {
            return Err(StoreError::Conflict {
                key: key.to_string(),
                expected: record.version,
                found,
            }
            .into());
        }

        record.version += 1;
        let json = serde_json::to_vec_pretty(&record).map_err(|source| StoreError::Corrupt {
            key: key.to_string(),
            source,
        })?;

        let path = record_path(&self.root, key);
        tokio::task::spawn_blocking(move || write_atomic(&path, &json))
            .await
            .context("store writer task panicked")?
            .map_err(|source| StoreError::Io {
                key: key.to_string(),
                source,
            })?;

        tracing::debug!("wrote {key} at version {}", record.version);
        Ok(record)
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "record path has no parent"))?;
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

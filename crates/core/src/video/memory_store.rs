//! In-memory implementation of [`VideoStore`].

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::store::{StoreError, VideoFilter, VideoStore};
use super::{GeneratedArtifact, VideoRecord, VideoStatus, VideoUpdate};

#[derive(Default)]
struct Inner {
    records: HashMap<String, VideoRecord>,
    statuses: HashMap<String, VideoStatus>,
    artifacts: HashMap<String, GeneratedArtifact>,
    /// Keys in registration order.
    order: Vec<String>,
}

/// Process-local video store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryVideoStore {
    inner: RwLock<Inner>,
}

impl MemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("video store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("video store lock poisoned".to_string()))
    }
}

impl VideoStore for MemoryVideoStore {
    fn create(&self, record: VideoRecord) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        let key = record.key().to_string();
        if inner.records.contains_key(&key) {
            return Ok(false);
        }
        inner.order.push(key.clone());
        inner.records.insert(key.clone(), record);
        debug!(key = %key, "Registered video record");
        Ok(true)
    }

    fn update(&self, key: &str, update: &VideoUpdate) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        match inner.records.get_mut(key) {
            Some(record) => {
                update.apply(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn get(&self, key: &str) -> Result<Option<VideoRecord>, StoreError> {
        Ok(self.read()?.records.get(key).cloned())
    }

    fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read()?.order.clone())
    }

    fn scan(&self, filter: &VideoFilter) -> Result<Vec<VideoRecord>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .order
            .iter()
            .filter_map(|key| inner.records.get(key))
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    fn set_status(&self, key: &str, status: VideoStatus) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        if !inner.records.contains_key(key) {
            return Ok(false);
        }
        inner.statuses.insert(key.to_string(), status);
        Ok(true)
    }

    fn status(&self, key: &str) -> Result<Option<VideoStatus>, StoreError> {
        Ok(self.read()?.statuses.get(key).copied())
    }

    fn keys_with_status(&self, status: VideoStatus) -> Result<Vec<String>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .order
            .iter()
            .filter(|key| inner.statuses.get(*key) == Some(&status))
            .cloned()
            .collect())
    }

    fn put_artifact(&self, key: &str, artifact: GeneratedArtifact) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        if !inner.records.contains_key(key) {
            return Ok(false);
        }
        inner.artifacts.insert(key.to_string(), artifact);
        Ok(true)
    }

    fn remove_artifact(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.write()?.artifacts.remove(key).is_some())
    }

    fn artifact(&self, key: &str) -> Result<Option<GeneratedArtifact>, StoreError> {
        Ok(self.read()?.artifacts.get(key).cloned())
    }

    // Check and write under one lock so concurrent callers cannot both pass
    // the check.
    fn transition(&self, key: &str, next: VideoStatus) -> Result<VideoStatus, StoreError> {
        let mut inner = self.write()?;
        if !inner.records.contains_key(key) {
            return Err(StoreError::NotFound(key.to_string()));
        }
        let current = inner
            .statuses
            .get(key)
            .copied()
            .unwrap_or(VideoStatus::Draft);
        if !current.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                key: key.to_string(),
                from: current,
                to: next,
            });
        }
        inner.statuses.insert(key.to_string(), next);
        Ok(current)
    }
}

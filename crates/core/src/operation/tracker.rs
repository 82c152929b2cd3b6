//! Tracking of in-flight external generation jobs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::video::{StoreError, VideoStore};

/// Default lifetime of an operation handle.
pub const DEFAULT_OPERATION_TTL_HOURS: i64 = 24;

/// Opaque reference to an external generation job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationHandle {
    /// Reference returned by the kickoff call.
    pub reference: String,
    /// When the handle was stored.
    pub created_at: DateTime<Utc>,
}

/// Result of looking up a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationLookup {
    /// Handle present and within its TTL.
    Active(OperationHandle),
    /// Handle was past its TTL; this read evicted it.
    Expired(OperationHandle),
    /// No handle stored (never stored, removed, or already evicted).
    Missing,
}

impl OperationLookup {
    pub fn into_active(self) -> Option<OperationHandle> {
        match self {
            OperationLookup::Active(handle) => Some(handle),
            _ => None,
        }
    }
}

/// Storage for operation handles keyed by video key.
pub trait OperationTracker: Send + Sync {
    /// Store a handle for `key`. Returns `false` if no video record exists
    /// under that key.
    fn store(&self, key: &str, reference: String) -> Result<bool, StoreError>;

    /// Look up a handle, evicting it if expired.
    fn lookup(&self, key: &str) -> Result<OperationLookup, StoreError>;

    /// Drop the handle for `key`, returning it if present.
    fn remove(&self, key: &str) -> Result<Option<OperationHandle>, StoreError>;

    /// The handle for `key`, or `None` if missing or expired.
    fn get(&self, key: &str) -> Result<Option<OperationHandle>, StoreError> {
        Ok(self.lookup(key)?.into_active())
    }
}

/// Process-local operation tracker bound to a video store and a clock.
pub struct MemoryOperationTracker {
    handles: RwLock<HashMap<String, OperationHandle>>,
    videos: Arc<dyn VideoStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl MemoryOperationTracker {
    pub fn new(videos: Arc<dyn VideoStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(videos, clock, Duration::hours(DEFAULT_OPERATION_TTL_HOURS))
    }

    pub fn with_ttl(videos: Arc<dyn VideoStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            handles: RwLock::new(HashMap::new()),
            videos,
            clock,
            ttl,
        }
    }

    /// Number of stored handles, expired ones included.
    pub fn len(&self) -> usize {
        self.handles.read().map(|h| h.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> StoreError {
        StoreError::Backend("operation tracker lock poisoned".to_string())
    }
}

impl OperationTracker for MemoryOperationTracker {
    fn store(&self, key: &str, reference: String) -> Result<bool, StoreError> {
        if self.videos.get(key)?.is_none() {
            warn!(key = %key, "Refusing to track operation for unknown video");
            return Ok(false);
        }
        let handle = OperationHandle {
            reference,
            created_at: self.clock.now(),
        };
        self.handles
            .write()
            .map_err(|_| Self::poisoned())?
            .insert(key.to_string(), handle);
        Ok(true)
    }

    fn lookup(&self, key: &str) -> Result<OperationLookup, StoreError> {
        let now = self.clock.now();
        let mut handles = self.handles.write().map_err(|_| Self::poisoned())?;

        let expired = match handles.get(key) {
            None => return Ok(OperationLookup::Missing),
            Some(handle) => now - handle.created_at > self.ttl,
        };

        if expired {
            let handle = handles.remove(key).ok_or_else(|| {
                StoreError::Backend(format!("operation handle for {} vanished", key))
            })?;
            info!(
                key = %key,
                created_at = %handle.created_at,
                "Operation handle expired, evicting"
            );
            return Ok(OperationLookup::Expired(handle));
        }

        Ok(handles
            .get(key)
            .cloned()
            .map(OperationLookup::Active)
            .unwrap_or(OperationLookup::Missing))
    }

    fn remove(&self, key: &str) -> Result<Option<OperationHandle>, StoreError> {
        Ok(self
            .handles
            .write()
            .map_err(|_| Self::poisoned())?
            .remove(key))
    }
}

//! Object storage backend abstraction (local filesystem/memory).

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};

/// Configuration for the object storage backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectStoreConfig {
    /// In-memory storage, gone when the session ends
    #[default]
    Memory,

    /// Local filesystem storage
    Local {
        /// Path to the storage directory
        path: PathBuf,
    },
}

/// Disjoint key prefixes, one per component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyspace {
    /// Archive records and payloads
    PolyOut,
    /// Serialized quad snapshots
    Quads,
}

impl Keyspace {
    pub fn prefix(&self) -> &'static str {
        match self {
            Keyspace::PolyOut => "poly-out",
            Keyspace::Quads => "quads",
        }
    }
}

impl fmt::Display for Keyspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Wrapper around the configured object storage backend.
#[derive(Debug, Clone)]
pub struct Storage {
    inner: Arc<dyn ObjectStore>,
}

impl Storage {
    /// Create a new storage backend from configuration.
    pub async fn new(config: ObjectStoreConfig) -> Result<Self> {
        let inner: Arc<dyn ObjectStore> = match &config {
            ObjectStoreConfig::Memory => Arc::new(InMemory::new()),

            ObjectStoreConfig::Local { path } => {
                // Ensure directory exists
                tokio::fs::create_dir_all(path).await?;
                Arc::new(
                    LocalFileSystem::new_with_prefix(path)
                        .map_err(|e| StorageError::InvalidConfig(e.to_string()))?,
                )
            }
        };
        tracing::debug!(?config, "storage backend ready");

        Ok(Self { inner })
    }

    /// In-memory backend.
    pub fn memory() -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
        }
    }

    /// Build the object path for a key within a keyspace.
    fn path(keyspace: Keyspace, key: &str) -> Result<ObjectPath> {
        if key.is_empty() || key.split('/').any(|part| part.is_empty() || part == "..") {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(ObjectPath::from(format!("{}/{}", keyspace.prefix(), key)))
    }

    /// Put an object into storage, replacing any previous value.
    pub async fn put(&self, keyspace: Keyspace, key: &str, data: Bytes) -> Result<()> {
        let path = Self::path(keyspace, key)?;
        self.inner.put(&path, data.into()).await?;
        Ok(())
    }

    /// Get an object from storage.
    pub async fn get(&self, keyspace: Keyspace, key: &str) -> Result<Option<Bytes>> {
        let path = Self::path(keyspace, key)?;
        match self.inner.get(&path).await {
            Ok(result) => {
                let bytes = result.bytes().await?;
                Ok(Some(bytes))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an object from storage.
    pub async fn delete(&self, keyspace: Keyspace, key: &str) -> Result<()> {
        let path = Self::path(keyspace, key)?;
        // Ignore NotFound errors - the object may already be deleted
        match self.inner.delete(&path).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// List all keys below `prefix` within a keyspace, relative to the keyspace.
    pub async fn list(&self, keyspace: Keyspace, prefix: &str) -> Result<Vec<String>> {
        use futures::TryStreamExt;

        let root = keyspace.prefix();
        let full = if prefix.is_empty() {
            ObjectPath::from(root)
        } else {
            ObjectPath::from(format!("{}/{}", root, prefix))
        };
        let stream = self.inner.list(Some(&full));

        let items: Vec<_> = match stream.try_collect().await {
            Ok(items) => items,
            // local backend reports a missing directory as NotFound
            Err(object_store::Error::NotFound { .. }) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut keys: Vec<String> = items
            .into_iter()
            .filter_map(|meta| {
                let path = meta.location.as_ref();
                path.strip_prefix(root)
                    .and_then(|rest| rest.strip_prefix('/'))
                    .map(|s| s.to_string())
            })
            .collect();
        keys.sort();

        Ok(keys)
    }
}

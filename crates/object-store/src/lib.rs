//! Durable Backing Store
//!
//! This crate provides the persistence layer shared by the polyPod file store
//! and quad store. It wraps the [`object_store`] crate so the same code runs
//! against an in-memory store (tests, mock pods) or a local directory.
//!
//! # Keyspaces
//!
//! Each component writes under its own [`Keyspace`], so the file store and the
//! quad store never touch each other's keys and no cross-component lock is
//! needed.
//!
//! # Example
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use polypod_object_store::{Keyspace, ObjectStoreConfig, Storage};
//!
//! # async fn example() -> polypod_object_store::Result<()> {
//! let storage = Storage::new(ObjectStoreConfig::Memory).await?;
//! storage.put(Keyspace::Quads, "0", Bytes::from("<a> <b> <c> .")).await?;
//! assert!(storage.get(Keyspace::Quads, "0").await?.is_some());
//! # Ok(())
//! # }
//! ```

mod error;
mod storage;

pub use error::{Result, StorageError};
pub use storage::{Keyspace, ObjectStoreConfig, Storage};

//! File storage (PolyOut)
//!
//! Features never see a filesystem. They import archives, which are handed
//! a `polypod://` id, and then read those archives (or the files inside
//! them, when the archive is a zip) back through the same few calls:
//!
//! ```text
//! importArchive(url) -> polypod://<uuid>
//! readDir("")                         -> [polypod://<uuid>, ...]
//! readDir("polypod://<uuid>")         -> [polypod://<uuid>/docs/a.json, ...]
//! readFile("polypod://<uuid>/docs/a.json")
//! ```

mod archive_store;
mod fetch;
mod zip_entries;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use archive_store::ArchiveStore;
pub use fetch::{Fetch, FetchedFile, FileUrl, UrlFetcher};

/// Metadata for an archive, a zip entry, or the storage root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub id: String,
    pub size: u64,
    /// Last modification; `None` for the storage root
    pub time: Option<DateTime<Utc>>,
    pub name: String,
    pub directory: bool,
}

impl Stats {
    /// The synthetic entry describing the storage root.
    pub fn root() -> Self {
        Self {
            id: String::new(),
            size: 0,
            time: None,
            name: String::new(),
            directory: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub path: String,
}

#[async_trait]
pub trait PolyOut: Send + Sync {
    /// Read the bytes of an archive or of a file inside one.
    async fn read_file(&self, id: &str) -> Result<Bytes>;

    /// Replace the content stored under `id`.
    async fn write_file(&self, id: &str, content: Bytes) -> Result<()>;

    /// Describe `id`; the empty id describes the storage root.
    async fn stat(&self, id: &str) -> Result<Stats>;

    /// List archives (empty id) or the entries of one archive.
    async fn read_dir(&self, id: &str) -> Result<Vec<Entry>>;

    /// Fetch `url` and store its payload, returning the archive id.
    async fn import_archive(&self, url: &str, dest: Option<&str>) -> Result<String>;

    /// Delete everything stored under `id`. Missing ids are not an error.
    async fn remove_archive(&self, id: &str) -> Result<()>;
}

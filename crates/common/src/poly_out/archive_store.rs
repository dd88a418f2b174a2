use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use object_store::{Keyspace, Storage};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::fetch::{Fetch, UrlFetcher};
use super::zip_entries;
use super::{Entry, PolyOut, Stats};
use crate::error::{PodError, Result};
use crate::uri::{is_polypod_uri, split_entry_id, PolyUri};

const BLOBS_PREFIX: &str = "blobs";
const RECORDS_PREFIX: &str = "records";

/// One import of a payload under an archive id.
///
/// Several records may share an id; they are read and removed together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ArchiveRecord {
    id: String,
    name: String,
    time: DateTime<Utc>,
    size: u64,
    /// BLAKE3 hash of the payload
    hash: String,
}

/// Archive storage over the durable backing store.
///
/// Payloads are content-addressed: each distinct payload is written once
/// under its hash, and records point at it. Every write goes through one
/// slot, so payload collection never sees a half-written import.
#[derive(Clone)]
pub struct ArchiveStore {
    storage: Storage,
    fetcher: Arc<dyn Fetch>,
    writes: Arc<Mutex<()>>,
}

impl ArchiveStore {
    pub fn new(storage: Storage) -> Self {
        Self::with_fetcher(storage, Arc::new(UrlFetcher::default()))
    }

    pub fn with_fetcher(storage: Storage, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            storage,
            fetcher,
            writes: Arc::default(),
        }
    }

    /// Key prefix holding the records of `id`. Only archive ids own
    /// records; anything else (the empty id included) would otherwise
    /// widen to the whole records tree.
    fn records_prefix(id: &str) -> Option<String> {
        if !is_polypod_uri(id) {
            return None;
        }
        Some(format!("{}/{}", RECORDS_PREFIX, hex::encode(id)))
    }

    fn blob_key(hash: &str) -> String {
        format!("{}/{}", BLOBS_PREFIX, hash)
    }

    async fn all_records(&self, prefix: &str) -> Result<Vec<(String, ArchiveRecord)>> {
        let keys = self.storage.list(Keyspace::PolyOut, prefix).await?;
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(raw) = self.storage.get(Keyspace::PolyOut, &key).await? else {
                continue;
            };
            let record: ArchiveRecord = serde_json::from_slice(&raw).map_err(|e| {
                PodError::BackendUnavailable(format!("corrupt archive record {}: {}", key, e))
            })?;
            records.push((key, record));
        }
        records.sort_by(|(_, a), (_, b)| a.time.cmp(&b.time).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Records for one id; an id with no records is NotFound.
    async fn records(&self, id: &str) -> Result<Vec<ArchiveRecord>> {
        let prefix =
            Self::records_prefix(id).ok_or_else(|| PodError::NotFound(id.to_string()))?;
        let records: Vec<ArchiveRecord> = self
            .all_records(&prefix)
            .await?
            .into_iter()
            .map(|(_, record)| record)
            .collect();
        if records.is_empty() {
            return Err(PodError::NotFound(id.to_string()));
        }
        Ok(records)
    }

    async fn payload(&self, record: &ArchiveRecord) -> Result<Bytes> {
        self.storage
            .get(Keyspace::PolyOut, &Self::blob_key(&record.hash))
            .await?
            .ok_or_else(|| {
                PodError::BackendUnavailable(format!("payload missing for {}", record.id))
            })
    }

    /// Write a payload and a record pointing at it. Callers hold `writes`.
    async fn put_record(&self, id: &str, name: &str, data: Bytes) -> Result<()> {
        let hash = blake3::hash(&data).to_hex().to_string();
        let record = ArchiveRecord {
            id: id.to_string(),
            name: name.to_string(),
            time: Utc::now(),
            size: data.len() as u64,
            hash: hash.clone(),
        };
        self.storage
            .put(Keyspace::PolyOut, &Self::blob_key(&hash), data)
            .await?;
        let encoded = serde_json::to_vec(&record)
            .map_err(|e| PodError::BackendUnavailable(e.to_string()))?;
        let prefix = Self::records_prefix(id)
            .ok_or_else(|| PodError::InvalidIdentifier(id.to_string()))?;
        let key = format!("{}/{}.json", prefix, Uuid::new_v4());
        self.storage
            .put(Keyspace::PolyOut, &key, encoded.into())
            .await?;
        Ok(())
    }

    /// Delete every record for `id`, then any payload left unreferenced.
    /// Callers hold `writes`.
    async fn delete_records(&self, id: &str) -> Result<usize> {
        let Some(prefix) = Self::records_prefix(id) else {
            return Ok(0);
        };
        let doomed = self.all_records(&prefix).await?;
        if doomed.is_empty() {
            return Ok(0);
        }
        for (key, _) in &doomed {
            self.storage.delete(Keyspace::PolyOut, key).await?;
        }

        let still_referenced: BTreeSet<String> = self
            .all_records(RECORDS_PREFIX)
            .await?
            .into_iter()
            .map(|(_, record)| record.hash)
            .collect();
        for (_, record) in &doomed {
            if !still_referenced.contains(&record.hash) {
                self.storage
                    .delete(Keyspace::PolyOut, &Self::blob_key(&record.hash))
                    .await?;
            }
        }
        Ok(doomed.len())
    }

    /// Zip entries of every payload stored under `archive_id`.
    async fn zip_entries(&self, archive_id: &str) -> Result<Vec<zip_entries::ZipEntry>> {
        let mut entries = Vec::new();
        for record in self.records(archive_id).await? {
            let payload = self.payload(&record).await?;
            entries.extend(zip_entries::list(archive_id, &payload)?);
        }
        Ok(entries)
    }
}

#[async_trait]
impl PolyOut for ArchiveStore {
    async fn read_file(&self, id: &str) -> Result<Bytes> {
        tracing::debug!(id, "poly_out: read_file");
        if let Some((archive_id, filename)) = split_entry_id(id) {
            for record in self.records(archive_id).await? {
                let payload = self.payload(&record).await?;
                if let Some(data) = zip_entries::read(archive_id, &payload, filename)? {
                    return Ok(data);
                }
            }
            return Err(PodError::NotFound(id.to_string()));
        }

        let records = self.records(id).await?;
        self.payload(&records[0]).await
    }

    async fn write_file(&self, id: &str, content: Bytes) -> Result<()> {
        tracing::debug!(id, size = content.len(), "poly_out: write_file");
        if split_entry_id(id).is_some() {
            return Err(PodError::ReadOnly(id.to_string()));
        }
        let uri: PolyUri = id.parse()?;

        let _slot = self.writes.lock().await;
        let name = match self.records(uri.as_str()).await {
            Ok(records) => records[0].name.clone(),
            Err(PodError::NotFound(_)) => String::new(),
            Err(e) => return Err(e),
        };
        self.delete_records(uri.as_str()).await?;
        self.put_record(uri.as_str(), &name, content).await
    }

    async fn stat(&self, id: &str) -> Result<Stats> {
        tracing::debug!(id, "poly_out: stat");
        if id.is_empty() {
            return Ok(Stats::root());
        }

        if let Some((archive_id, filename)) = split_entry_id(id) {
            for record in self.records(archive_id).await? {
                let payload = self.payload(&record).await?;
                if let Some(entry) = zip_entries::find(archive_id, &payload, filename)? {
                    return Ok(Stats {
                        id: id.to_string(),
                        size: entry.size,
                        time: entry.time,
                        name: entry.filename,
                        directory: entry.directory,
                    });
                }
            }
            return Err(PodError::NotFound(id.to_string()));
        }

        let records = self.records(id).await?;
        let record = &records[0];
        Ok(Stats {
            id: id.to_string(),
            size: record.size,
            time: Some(record.time),
            name: record.name.clone(),
            directory: false,
        })
    }

    async fn read_dir(&self, id: &str) -> Result<Vec<Entry>> {
        tracing::debug!(id, "poly_out: read_dir");
        if !id.is_empty() {
            let entries = self.zip_entries(id).await?;
            return Ok(entries
                .into_iter()
                .map(|entry| Entry {
                    id: format!("{}/{}", id, entry.filename),
                    path: entry.filename,
                })
                .collect());
        }

        let mut seen = BTreeSet::new();
        Ok(self
            .all_records(RECORDS_PREFIX)
            .await?
            .into_iter()
            .filter(|(_, record)| seen.insert(record.id.clone()))
            .map(|(_, record)| Entry {
                path: record.id.clone(),
                id: record.id,
            })
            .collect())
    }

    async fn import_archive(&self, url: &str, dest: Option<&str>) -> Result<String> {
        // validate before any I/O
        let id = match dest {
            Some(dest) => dest.parse::<PolyUri>()?,
            None => PolyUri::generate(),
        };

        let fetched = self.fetcher.fetch(url).await?;
        let size = fetched.data.len();
        {
            let _slot = self.writes.lock().await;
            self.put_record(id.as_str(), &fetched.name, fetched.data)
                .await?;
        }

        tracing::info!(id = %id, name = %fetched.name, size, "imported archive");
        Ok(id.into())
    }

    async fn remove_archive(&self, id: &str) -> Result<()> {
        let removed = {
            let _slot = self.writes.lock().await;
            self.delete_records(id).await?
        };
        tracing::info!(id, removed, "removed archive");
        Ok(())
    }
}

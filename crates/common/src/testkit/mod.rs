//! In-process stand-ins for the outside world, for tests.
//!
//! A [`ScriptedHost`] answers prompts from a script and records what the
//! pod asked of it; a [`StaticFetcher`] serves archive downloads from a map.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use common::pod::{Pod, PodConfig};
//! use common::session::Manifest;
//! use common::testkit::ScriptedHost;
//!
//! # async fn example() -> common::error::Result<()> {
//! let host = Arc::new(ScriptedHost::new());
//! host.answer_next(true);
//! let config = PodConfig {
//!     manifest: Manifest::new("Explorer").with_link("help", "https://example.org/help"),
//!     ..PodConfig::default()
//! };
//! let pod = Pod::open(&config, host.clone()).await?;
//! pod.poly_nav().open_url("help").await?;
//! assert_eq!(host.opened_urls().len(), 1);
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, VecDeque};
use std::io::{Cursor, Write};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use url::Url;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::error::{PodError, Result};
use crate::nav::{Host, PickerEvent};
use crate::poly_out::{Fetch, FetchedFile};

/// A [`Host`] whose user follows a script.
///
/// Confirmations are answered in the order queued with
/// [`answer_next`](Self::answer_next); once the script runs out every prompt
/// is declined.
#[derive(Default)]
pub struct ScriptedHost {
    answers: Mutex<VecDeque<bool>>,
    prompts: Mutex<Vec<String>>,
    opened: Mutex<Vec<String>>,
    titles: Mutex<Vec<String>>,
    history: Mutex<Vec<String>>,
    picks: Mutex<VecDeque<mpsc::Receiver<PickerEvent>>>,
    pick_types: Mutex<Vec<Option<String>>>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer_next(&self, answer: bool) {
        self.answers.lock().push_back(answer);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.opened.lock().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.titles.lock().clone()
    }

    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    pub fn pick_types(&self) -> Vec<Option<String>> {
        self.pick_types.lock().clone()
    }

    /// Script the next picker: it reports `events`, then closes.
    pub fn queue_pick(&self, events: Vec<PickerEvent>) {
        drop(self.queue_pick_open(events));
    }

    /// Script the next picker but leave it open; it closes when the
    /// returned sender is dropped.
    pub fn queue_pick_open(&self, events: Vec<PickerEvent>) -> mpsc::Sender<PickerEvent> {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            // capacity covers every scripted event
            let _ = tx.try_send(event);
        }
        self.picks.lock().push_back(rx);
        tx
    }
}

#[async_trait]
impl Host for ScriptedHost {
    async fn confirm(&self, message: &str) -> bool {
        self.prompts.lock().push(message.to_string());
        self.answers.lock().pop_front().unwrap_or(false)
    }

    async fn open_url(&self, url: &Url) -> Result<()> {
        self.opened.lock().push(url.to_string());
        Ok(())
    }

    async fn show_title(&self, title: &str) {
        self.titles.lock().push(title.to_string());
    }

    async fn push_history(&self, title: &str) {
        self.history.lock().push(title.to_string());
    }

    async fn pick_file(&self, mime_type: Option<&str>) -> Result<mpsc::Receiver<PickerEvent>> {
        self.pick_types.lock().push(mime_type.map(str::to_string));
        match self.picks.lock().pop_front() {
            Some(events) => Ok(events),
            None => {
                let (_, rx) = mpsc::channel(1);
                Ok(rx)
            }
        }
    }
}

/// Serves fixed payloads by URL.
#[derive(Default)]
pub struct StaticFetcher {
    files: HashMap<String, Bytes>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: &str, data: Bytes) {
        self.files.insert(url.to_string(), data);
    }
}

#[async_trait]
impl Fetch for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedFile> {
        let data = self
            .files
            .get(url)
            .cloned()
            .ok_or_else(|| PodError::NotFound(url.to_string()))?;
        let name = url.rsplit('/').next().unwrap_or(url).to_string();
        Ok(FetchedFile { name, data })
    }
}

/// Build a zip in memory. Names ending in `/` become directory entries.
pub fn zip_archive(entries: &[(&str, &str)]) -> Bytes {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    for (name, content) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(name.trim_end_matches('/'), options)
                .expect("zip directory");
        } else {
            writer.start_file(*name, options).expect("zip entry");
            writer.write_all(content.as_bytes()).expect("zip write");
        }
    }
    let cursor = writer.finish().expect("zip finish");
    Bytes::from(cursor.into_inner())
}

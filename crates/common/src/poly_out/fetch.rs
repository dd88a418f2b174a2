use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use reqwest::Client;
use url::Url;

use crate::error::{PodError, Result};
use crate::session::Session;
use crate::uri::PICKED_SCHEME;

const IMPORT_OP: &str = "importArchive";

/// A source reference split into where the bytes live and the file name.
///
/// Picked files are handed to features as `<source>/<fileName>` so the name
/// survives even when the source itself (a `data:` URL) carries none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUrl {
    pub url: String,
    pub data: String,
    pub file_name: String,
}

impl FileUrl {
    const SEPARATOR: char = '/';

    pub fn from_url(url: &str) -> Self {
        match url.rsplit_once(Self::SEPARATOR) {
            Some((data, file_name)) => Self {
                url: url.to_string(),
                data: data.to_string(),
                file_name: file_name.to_string(),
            },
            None => Self {
                url: url.to_string(),
                data: String::new(),
                file_name: url.to_string(),
            },
        }
    }

    pub fn from_parts(data: &str, file_name: &str) -> Self {
        Self {
            url: format!("{}{}{}", data, Self::SEPARATOR, file_name),
            data: data.to_string(),
            file_name: file_name.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub name: String,
    pub data: Bytes,
}

/// Resolves an import source to bytes.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedFile>;
}

/// Default fetcher for `data:` and `http(s)://` sources.
///
/// Host files are reachable only through the references a session handed
/// out from `pickFile`; a bare `file://` URL is refused.
#[derive(Debug, Clone, Default)]
pub struct UrlFetcher {
    client: Client,
    session: Option<Arc<Session>>,
}

impl UrlFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            session: None,
        }
    }

    /// A fetcher that also resolves the files picked in `session`.
    pub fn for_session(session: Arc<Session>) -> Self {
        Self {
            client: Client::default(),
            session: Some(session),
        }
    }

    async fn fetch_picked(&self, reference: &str) -> Result<FetchedFile> {
        let source = self
            .session
            .as_ref()
            .and_then(|session| session.picked_source(reference))
            .ok_or_else(|| not_picked(reference))?;
        let url = Url::parse(&source)
            .map_err(|e| PodError::transport(IMPORT_OP, format!("bad URL {}: {}", source, e)))?;
        let fetched = match url.scheme() {
            "file" => Self::fetch_file(&url).await,
            "http" | "https" => self.fetch_http(&url).await,
            other => Err(PodError::transport(
                IMPORT_OP,
                format!("unsupported picked source: {}", other),
            )),
        };
        // errors name the reference, never the host path behind it
        let mut fetched = fetched.map_err(|e| match e {
            PodError::NotFound(_) => PodError::NotFound(reference.to_string()),
            other => other,
        })?;
        fetched.name = FileUrl::from_url(reference).file_name;
        Ok(fetched)
    }

    async fn fetch_data_url(file_url: &FileUrl) -> Result<FetchedFile> {
        let (header, payload) = file_url
            .data
            .split_once(',')
            .ok_or_else(|| PodError::transport(IMPORT_OP, "malformed data URL"))?;
        let data = if header.ends_with(";base64") {
            base64::engine::general_purpose::STANDARD
                .decode(payload)
                .map_err(|e| PodError::transport(IMPORT_OP, e))?
        } else {
            payload.as_bytes().to_vec()
        };
        Ok(FetchedFile {
            name: file_url.file_name.clone(),
            data: data.into(),
        })
    }

    async fn fetch_file(url: &Url) -> Result<FetchedFile> {
        let path: PathBuf = url
            .to_file_path()
            .map_err(|_| PodError::transport(IMPORT_OP, format!("bad file URL: {}", url)))?;
        let data = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PodError::NotFound(url.to_string()),
            _ => PodError::transport(IMPORT_OP, e),
        })?;
        Ok(FetchedFile {
            name: file_name_of(url),
            data: data.into(),
        })
    }

    async fn fetch_http(&self, url: &Url) -> Result<FetchedFile> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PodError::transport(IMPORT_OP, e))?;
        if !response.status().is_success() {
            return Err(PodError::transport(
                IMPORT_OP,
                format!("unexpected response: {}", response.status()),
            ));
        }
        let data = response
            .bytes()
            .await
            .map_err(|e| PodError::transport(IMPORT_OP, e))?;
        Ok(FetchedFile {
            name: file_name_of(url),
            data,
        })
    }
}

fn not_picked(url: &str) -> PodError {
    PodError::PermissionDenied(format!("{} was not picked by the user", url))
}

fn file_name_of(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("archive")
        .to_string()
}

#[async_trait]
impl Fetch for UrlFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedFile> {
        if url.starts_with("data:") {
            return Self::fetch_data_url(&FileUrl::from_url(url)).await;
        }
        if url
            .strip_prefix(PICKED_SCHEME)
            .is_some_and(|rest| rest.starts_with("://"))
        {
            return self.fetch_picked(url).await;
        }
        let parsed = Url::parse(url)
            .map_err(|e| PodError::transport(IMPORT_OP, format!("bad URL {}: {}", url, e)))?;
        match parsed.scheme() {
            "file" => Err(not_picked(url)),
            "http" | "https" => self.fetch_http(&parsed).await,
            other => Err(PodError::transport(
                IMPORT_OP,
                format!("unsupported source scheme: {}", other),
            )),
        }
    }
}

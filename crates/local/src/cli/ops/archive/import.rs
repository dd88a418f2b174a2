use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::Args;
use common::error::PodError;
use common::poly_out::FileUrl;

use crate::cli::ops::PodOpError;

#[derive(Args, Debug, Clone)]
pub struct Import {
    /// URL to fetch (http(s), data, or a reference from a pick)
    #[arg(group = "source")]
    pub url: Option<String>,

    /// Local file to import, sent to the pod inline
    #[arg(long, group = "source")]
    pub file: Option<PathBuf>,

    /// Ask for a file interactively
    #[arg(long, group = "source")]
    pub pick: bool,

    /// MIME type offered to the picker
    #[arg(long, requires = "pick")]
    pub mime_type: Option<String>,

    /// Store under this polypod:// id instead of a fresh one
    #[arg(long)]
    pub dest: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Pod(#[from] PodOpError),
    #[error("one of <URL>, --file or --pick must be provided")]
    NoSource,
    #[error("cannot import {0}: not a readable file")]
    BadFile(PathBuf),
    #[error("no file picked")]
    Cancelled,
}

impl From<PodError> for ImportError {
    fn from(err: PodError) -> Self {
        ImportError::Pod(err.into())
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Import {
    type Error = ImportError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let pod = ctx.open_pod().await.map_err(PodOpError::from)?;

        let url = if let Some(url) = &self.url {
            url.clone()
        } else if let Some(path) = &self.file {
            inline_source(path).await?
        } else if self.pick {
            pod.poly_nav()
                .pick_file(self.mime_type.as_deref())
                .await?
                .ok_or(ImportError::Cancelled)?
                .url
        } else {
            return Err(ImportError::NoSource);
        };

        let id = pod
            .poly_out()
            .import_archive(&url, self.dest.as_deref())
            .await?;
        Ok(id)
    }
}

/// A `data:` source carrying the file's bytes and name, so the pod never
/// reads host paths on its own.
async fn inline_source(path: &Path) -> Result<String, ImportError> {
    let bad_file = || ImportError::BadFile(path.to_path_buf());
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(bad_file)?;
    let data = tokio::fs::read(path).await.map_err(|_| bad_file())?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let source = format!("data:{};base64,{}", mime, STANDARD.encode(data));
    Ok(FileUrl::from_parts(&source, name).url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_inline_source_keeps_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.zip");
        std::fs::write(&path, b"\x00zip/bytes").unwrap();

        let source = inline_source(&path).await.unwrap();
        let file_url = FileUrl::from_url(&source);
        assert_eq!(file_url.file_name, "export.zip");
        assert!(file_url.data.starts_with("data:application/zip;base64,"));

        let encoded = file_url.data.split_once(',').unwrap().1;
        assert_eq!(STANDARD.decode(encoded).unwrap(), b"\x00zip/bytes");
    }

    #[tokio::test]
    async fn test_inline_source_of_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            inline_source(&dir.path().join("nope.zip")).await,
            Err(ImportError::BadFile(_))
        ));
    }
}

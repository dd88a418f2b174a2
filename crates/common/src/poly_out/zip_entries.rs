//! Read-only view of the entries inside a stored zip payload.
//!
//! Nothing here is cached: every call parses the central directory of the
//! payload it was given, so a listing can never outlive the archive.

use std::io::{Cursor, Read};

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use zip::ZipArchive;

use crate::error::{PodError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    pub filename: String,
    pub size: u64,
    pub time: Option<DateTime<Utc>>,
    pub directory: bool,
}

fn open(archive_id: &str, payload: &Bytes) -> Result<ZipArchive<Cursor<Bytes>>> {
    ZipArchive::new(Cursor::new(payload.clone())).map_err(|e| PodError::InvalidArchive {
        id: archive_id.to_string(),
        cause: e.to_string(),
    })
}

fn archive_error(archive_id: &str, err: zip::result::ZipError) -> PodError {
    PodError::InvalidArchive {
        id: archive_id.to_string(),
        cause: err.to_string(),
    }
}

fn to_utc(time: zip::DateTime) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(
        i32::from(time.year()),
        u32::from(time.month()),
        u32::from(time.day()),
    )?
    .and_hms_opt(
        u32::from(time.hour()),
        u32::from(time.minute()),
        u32::from(time.second()),
    )
    .map(|naive| naive.and_utc())
}

/// List every entry of the zip in central-directory order.
pub fn list(archive_id: &str, payload: &Bytes) -> Result<Vec<ZipEntry>> {
    let mut archive = open(archive_id, payload)?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let file = archive
            .by_index(index)
            .map_err(|e| archive_error(archive_id, e))?;
        entries.push(ZipEntry {
            filename: file.name().to_string(),
            size: file.size(),
            time: to_utc(file.last_modified()),
            directory: file.is_dir(),
        });
    }
    Ok(entries)
}

/// Find one entry by its in-archive path.
pub fn find(archive_id: &str, payload: &Bytes, filename: &str) -> Result<Option<ZipEntry>> {
    Ok(list(archive_id, payload)?
        .into_iter()
        .find(|entry| entry.filename == filename))
}

/// Decompress one file entry.
pub fn read(archive_id: &str, payload: &Bytes, filename: &str) -> Result<Option<Bytes>> {
    let mut archive = open(archive_id, payload)?;
    let mut file = match archive.by_name(filename) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(archive_error(archive_id, e)),
    };
    if file.is_dir() {
        return Err(PodError::NotAFile(format!("{}/{}", archive_id, filename)));
    }
    let mut data = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut data)
        .map_err(|e| PodError::InvalidArchive {
            id: archive_id.to_string(),
            cause: e.to_string(),
        })?;
    Ok(Some(data.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::zip_archive;

    #[test]
    fn test_list_and_read() {
        let payload = zip_archive(&[("docs/", ""), ("docs/a.json", r#"{"a":1}"#)]);

        let entries = list("polypod://x", &payload).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].directory);
        assert_eq!(entries[1].filename, "docs/a.json");
        assert_eq!(entries[1].size, 7);

        let data = read("polypod://x", &payload, "docs/a.json").unwrap().unwrap();
        assert_eq!(data, Bytes::from_static(br#"{"a":1}"#));
        assert!(read("polypod://x", &payload, "docs/b.json").unwrap().is_none());
    }

    #[test]
    fn test_reading_a_directory_fails() {
        let payload = zip_archive(&[("docs/", "")]);
        assert!(matches!(
            read("polypod://x", &payload, "docs/"),
            Err(PodError::NotAFile(_))
        ));
    }

    #[test]
    fn test_non_zip_payload() {
        let payload = Bytes::from_static(b"definitely not a zip");
        assert!(matches!(
            list("polypod://x", &payload),
            Err(PodError::InvalidArchive { .. })
        ));
    }
}

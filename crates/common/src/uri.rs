//! Identifiers for stored archives.
//!
//! Archives live under the private `polypod://` scheme. Files inside an
//! archive are addressed by appending the in-archive path to the archive id,
//! e.g. `polypod://0f3c.../docs/a.json`.

use std::fmt;
use std::str::FromStr;

use url::Url;
use uuid::Uuid;

use crate::error::PodError;

pub const POLYPOD_SCHEME: &str = "polypod";

/// Scheme of the references `pickFile` hands out in place of host paths.
pub const PICKED_SCHEME: &str = "polypod-picked";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolyUri(String);

impl PolyUri {
    /// Mint a fresh archive id. Ids are random, so a removed id is never handed
    /// out again.
    pub fn generate() -> Self {
        PolyUri(format!("{}://{}", POLYPOD_SCHEME, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolyUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PolyUri {
    type Err = PodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_polypod_uri(s) {
            return Err(PodError::InvalidIdentifier(s.to_string()));
        }
        // anything past the host would be read back as a zip entry path
        if split_entry_id(s).is_some() {
            return Err(PodError::InvalidIdentifier(s.to_string()));
        }
        Ok(PolyUri(s.trim_end_matches('/').to_string()))
    }
}

impl From<PolyUri> for String {
    fn from(uri: PolyUri) -> Self {
        uri.0
    }
}

/// Whether `s` parses as a URI under the private scheme with a host.
pub fn is_polypod_uri(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => {
            url.scheme() == POLYPOD_SCHEME && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// Split an id of the form `scheme://host/inner/path` into the archive id and
/// the path inside the archive. Returns `None` for top-level ids.
pub fn split_entry_id(id: &str) -> Option<(&str, &str)> {
    let authority_start = id.find("://")? + 3;
    let slash = id[authority_start..].find('/')? + authority_start;
    let (archive, rest) = (&id[..slash], &id[slash + 1..]);
    if archive.len() == authority_start || rest.is_empty() {
        return None;
    }
    Some((archive, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_uris_validate() {
        let uri = PolyUri::generate();
        assert!(uri.as_str().starts_with("polypod://"));
        assert!(is_polypod_uri(uri.as_str()));
        assert_eq!(uri.as_str().parse::<PolyUri>().unwrap(), uri);
        assert_ne!(PolyUri::generate(), uri);
    }

    #[test]
    fn test_rejects_foreign_schemes() {
        assert!(!is_polypod_uri("bar"));
        assert!(!is_polypod_uri("https://example.com"));
        assert!(!is_polypod_uri("polypod:"));
        assert!(matches!(
            "file:///tmp/x".parse::<PolyUri>(),
            Err(PodError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_rejects_ids_with_paths() {
        assert!(matches!(
            "polypod://abc/inner.json".parse::<PolyUri>(),
            Err(PodError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_split_entry_id() {
        assert_eq!(
            split_entry_id("polypod://abc/docs/a.json"),
            Some(("polypod://abc", "docs/a.json"))
        );
        assert_eq!(split_entry_id("polypod://abc"), None);
        assert_eq!(split_entry_id("polypod://abc/"), None);
        assert_eq!(split_entry_id("no-scheme/path"), None);
        assert_eq!(split_entry_id(""), None);
    }
}

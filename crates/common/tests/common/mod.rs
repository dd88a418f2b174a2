//! Shared setup for pod integration tests
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use common::endpoint::{EndpointInfo, EndpointTable};
use common::pod::{Pod, PodConfig};
use common::session::Manifest;
use common::testkit::{zip_archive, ScriptedHost, StaticFetcher};
use object_store::ObjectStoreConfig;

pub const ARCHIVE_URL: &str = "https://host/file.zip";
pub const ENTRY_JSON: &str = r#"{"visits":[]}"#;

pub fn test_archive() -> Bytes {
    zip_archive(&[("docs/", ""), ("docs/a.json", ENTRY_JSON), ("readme.txt", "hi")])
}

pub fn test_config(storage: ObjectStoreConfig) -> PodConfig {
    PodConfig {
        storage,
        endpoints: EndpointTable::default().with_endpoint(
            "polyPediaReport",
            EndpointInfo {
                url: "https://example.org/report".to_string(),
                auth: String::new(),
                allow_insecure: false,
            },
        ),
        manifest: Manifest::new("Explorer").with_link("help", "https://example.org/help"),
    }
}

fn test_fetcher() -> Arc<StaticFetcher> {
    let mut fetcher = StaticFetcher::new();
    fetcher.insert(ARCHIVE_URL, test_archive());
    Arc::new(fetcher)
}

/// An in-memory pod whose only downloadable archive is [`ARCHIVE_URL`].
pub async fn setup_test_pod() -> (Pod, Arc<ScriptedHost>) {
    let host = Arc::new(ScriptedHost::new());
    let pod = Pod::open_with_fetcher(
        &test_config(ObjectStoreConfig::Memory),
        host.clone(),
        test_fetcher(),
    )
    .await
    .unwrap();
    (pod, host)
}

/// A pod persisted under `dir`; opening it twice sees the same data.
pub async fn setup_durable_pod(dir: &Path) -> (Pod, Arc<ScriptedHost>) {
    let host = Arc::new(ScriptedHost::new());
    let config = test_config(ObjectStoreConfig::Local {
        path: dir.to_path_buf(),
    });
    let pod = Pod::open_with_fetcher(&config, host.clone(), test_fetcher())
        .await
        .unwrap();
    (pod, host)
}

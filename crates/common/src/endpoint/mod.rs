//! Endpoint gateway
//!
//! Features may talk to a fixed set of servers, named in an allow-list the
//! feature cannot change. Every call is confirmed by the user first.

mod http;

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{PodError, Result};

pub use http::HttpEndpoint;

#[async_trait]
pub trait Endpoint: Send + Sync {
    /// POST `payload` to the named endpoint.
    async fn send(
        &self,
        endpoint_id: &str,
        payload: &str,
        content_type: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<()>;

    /// GET the named endpoint's body.
    async fn get(
        &self,
        endpoint_id: &str,
        content_type: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointInfo {
    pub url: String,
    /// Default credential, used when the caller passes none
    #[serde(default)]
    pub auth: String,
    #[serde(default)]
    pub allow_insecure: bool,
}

/// The endpoint allow-list, keyed by symbolic name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointTable {
    endpoints: BTreeMap<String, EndpointInfo>,
}

impl EndpointTable {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| PodError::Config(format!("invalid endpoint table: {}", e)))
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PodError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn with_endpoint(mut self, name: impl Into<String>, info: EndpointInfo) -> Self {
        self.endpoints.insert(name.into(), info);
        self
    }

    pub fn get(&self, name: &str) -> Option<&EndpointInfo> {
        self.endpoints.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_from_json() {
        let table = EndpointTable::from_json(
            r#"{
                "polyPediaReport": { "url": "https://example.org/report", "auth": "user:pw", "allowInsecure": false },
                "demoTest": { "url": "http://localhost:8000" , "allowInsecure": true }
            }"#,
        )
        .unwrap();

        assert_eq!(table.names().collect::<Vec<_>>(), vec!["demoTest", "polyPediaReport"]);
        let demo = table.get("demoTest").unwrap();
        assert!(demo.allow_insecure);
        assert!(demo.auth.is_empty());
        assert_eq!(table.get("polyPediaReport").unwrap().auth, "user:pw");
        assert!(table.get("unknown").is_none());
    }

    #[test]
    fn test_malformed_table() {
        assert!(matches!(
            EndpointTable::from_json(r#"{ "x": { "auth": "a" } }"#),
            Err(PodError::Config(_))
        ));
    }
}

//! Wire format of the bridge.
//!
//! A request travels as `{"id": 7, "request": {"method": "readFile",
//! "params": {"id": "polypod://..."}}}` and is answered by
//! `{"id": 7, "result": {"Ok": {"type": "bytes", "value": "<base64>"}}}`.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::PodError;
use crate::nav::{Action, ExternalFile};
use crate::poly_in::QueryResult;
use crate::poly_out::{Entry, Stats};
use crate::rdf::{Matcher, Quad};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "method",
    content = "params",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum BridgeRequest {
    /// Handshake; answered once the host side is ready
    Hello,

    ReadFile {
        id: String,
    },
    WriteFile {
        id: String,
        content: Payload,
    },
    Stat {
        id: String,
    },
    ReadDir {
        id: String,
    },
    ImportArchive {
        url: String,
        #[serde(default)]
        dest: Option<String>,
    },
    RemoveArchive {
        id: String,
    },

    Match {
        matcher: Matcher,
    },
    Add {
        quad: Quad,
    },
    Delete {
        quad: Quad,
    },
    Has {
        quad: Quad,
    },
    Query {
        sparql: String,
    },
    Update {
        sparql: String,
    },

    OpenUrl {
        link: String,
    },
    SetActiveActions {
        actions: Vec<Action>,
    },
    SetTitle {
        title: String,
    },
    PickFile {
        #[serde(default)]
        mime_type: Option<String>,
    },

    EndpointSend {
        endpoint_id: String,
        payload: String,
        #[serde(default)]
        content_type: Option<String>,
        #[serde(default)]
        auth_token: Option<String>,
    },
    EndpointGet {
        endpoint_id: String,
        #[serde(default)]
        content_type: Option<String>,
        #[serde(default)]
        auth_token: Option<String>,
    },

    GetRuntime,
    GetVersion,
}

impl BridgeRequest {
    /// The method name as it appears on the wire.
    pub fn method(&self) -> &'static str {
        match self {
            BridgeRequest::Hello => "hello",
            BridgeRequest::ReadFile { .. } => "readFile",
            BridgeRequest::WriteFile { .. } => "writeFile",
            BridgeRequest::Stat { .. } => "stat",
            BridgeRequest::ReadDir { .. } => "readDir",
            BridgeRequest::ImportArchive { .. } => "importArchive",
            BridgeRequest::RemoveArchive { .. } => "removeArchive",
            BridgeRequest::Match { .. } => "match",
            BridgeRequest::Add { .. } => "add",
            BridgeRequest::Delete { .. } => "delete",
            BridgeRequest::Has { .. } => "has",
            BridgeRequest::Query { .. } => "query",
            BridgeRequest::Update { .. } => "update",
            BridgeRequest::OpenUrl { .. } => "openUrl",
            BridgeRequest::SetActiveActions { .. } => "setActiveActions",
            BridgeRequest::SetTitle { .. } => "setTitle",
            BridgeRequest::PickFile { .. } => "pickFile",
            BridgeRequest::EndpointSend { .. } => "endpointSend",
            BridgeRequest::EndpointGet { .. } => "endpointGet",
            BridgeRequest::GetRuntime => "getRuntime",
            BridgeRequest::GetVersion => "getVersion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum BridgeResponse {
    Hello { runtime: String },
    Unit,
    Bytes(Payload),
    Stats(Stats),
    Entries(Vec<Entry>),
    Id(String),
    Quads(Vec<Quad>),
    Bool(bool),
    QueryResult(QueryResult),
    File(Option<ExternalFile>),
    Text(String),
}

/// Binary content, base64 on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(#[serde(with = "base64_bytes")] pub Bytes);

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload(bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub id: u64,
    pub request: BridgeRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: u64,
    pub result: Result<BridgeResponse, PodError>,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded)
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}
